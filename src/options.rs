//! Configuration for load and save sessions.
//!
//! - [`LoadOptions`]: how a document is read
//! - [`SaveOptions`]: how a graph is written
//!
//! ## Examples
//!
//! ```rust
//! use sdata::{from_str_untyped_with_options, to_string_untyped_with_options, LoadOptions, SaveOptions};
//!
//! let options = LoadOptions::new().with_file_path("inline.sdata");
//! let value = from_str_untyped_with_options("{ a = 1 }", options).unwrap();
//!
//! let text = to_string_untyped_with_options(&value, SaveOptions::compact()).unwrap();
//! assert_eq!(text, "{ a = 1 }");
//! ```

/// Options for reading a document.
///
/// # Examples
///
/// ```rust
/// use sdata::LoadOptions;
///
/// let options = LoadOptions::new().with_file_path("config/app.sdata");
/// assert_eq!(options.file_path.as_deref(), Some("config/app.sdata"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Stamped into every span, so diagnostics can name their document.
    pub file_path: Option<String>,
}

impl LoadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }
}

/// Options for writing a document.
///
/// Pretty output puts every property, item and entry on its own line,
/// indented `indent` spaces per nesting level. Compact output writes the
/// whole document on one line.
///
/// # Examples
///
/// ```rust
/// use sdata::SaveOptions;
///
/// let options = SaveOptions::new();
/// assert_eq!(options.indent, 4);
/// assert!(options.pretty);
///
/// let options = SaveOptions::compact();
/// assert!(!options.pretty);
///
/// let options = SaveOptions::pretty().with_indent(2);
/// assert_eq!(options.indent, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    pub indent: usize,
    pub pretty: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            indent: 4,
            pretty: true,
        }
    }
}

impl SaveOptions {
    /// Creates default options (pretty, 4-space indent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pretty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn compact() -> Self {
        SaveOptions {
            pretty: false,
            ..Default::default()
        }
    }

    /// Sets the number of spaces per nesting level. Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
