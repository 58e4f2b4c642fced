//! Error types for loading and saving SData documents.
//!
//! Parsing problems are not reported through [`Error`] directly. They are
//! collected as [`Diagnostic`]s in a [`LoadingContext`](crate::LoadingContext)
//! and the session unwinds with [`Error::Aborted`]. The crate-root functions
//! turn that signal into [`Error::Load`], which carries the full, ordered
//! diagnostic list.
//!
//! ## Error Categories
//!
//! - **Load errors**: the document is malformed or does not match its metadata
//! - **Metadata errors**: a [`MetadataBuilder`](crate::MetadataBuilder) was given
//!   an inconsistent descriptor tree
//! - **Value errors**: the saver was handed a graph its metadata does not describe
//! - **I/O errors**: reading or writing the underlying stream failed
//! - **Internal errors**: a condition the engine does not expect; always surfaced
//!
//! ## Examples
//!
//! ```rust
//! use sdata::{from_str_untyped, Error};
//!
//! let result = from_str_untyped("{ a = 1, a = 2 }");
//! match result {
//!     Err(Error::Load(diagnostics)) => assert_eq!(diagnostics.len(), 1),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use crate::diag::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while loading or saving.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The document failed to load; every recorded diagnostic is attached.
    #[error("{}", DisplayDiagnostics(.0))]
    Load(Vec<Diagnostic>),

    /// Unwinds a session back to its entry point.
    ///
    /// Raised only after at least one diagnostic has been recorded in the
    /// session's [`LoadingContext`](crate::LoadingContext); carries nothing itself.
    #[error("loading aborted")]
    Aborted,

    /// The metadata descriptor tree is inconsistent.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// A value handed to the saver does not match its declared type.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Unexpected engine condition.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates a metadata validation error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdata::Error;
    ///
    /// let err = Error::invalid_metadata("class '{urn:x}A' is defined twice");
    /// assert!(err.to_string().contains("defined twice"));
    /// ```
    pub fn invalid_metadata<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidMetadata(msg.to_string())
    }

    /// Creates an error for a value that does not fit its declared type.
    pub fn invalid_value<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidValue(msg.to_string())
    }

    /// Creates an internal error.
    pub fn internal<T: fmt::Display>(msg: T) -> Self {
        Error::Internal(msg.to_string())
    }

    /// Returns the diagnostics of a failed load, if this is one.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&[Diagnostic]> {
        match self {
            Error::Load(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }

    /// Returns `true` for the payload-free unwind signal.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted)
    }
}

struct DisplayDiagnostics<'a>(&'a [Diagnostic]);

impl fmt::Display for DisplayDiagnostics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "loading failed");
        }
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{DiagnosticCode, TextPosition, TextSpan};

    #[test]
    fn test_load_error_lists_every_diagnostic() {
        let span = TextSpan::new(None, 0, 1, TextPosition::new(1, 1), TextPosition::new(1, 2));
        let err = Error::Load(vec![
            Diagnostic::error(DiagnosticCode::PropertyMissing, "Property 'y' missing.", span.clone()),
            Diagnostic::error(DiagnosticCode::PropertyMissing, "Property 'z' missing.", span),
        ]);
        let text = err.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("'y'"));
        assert!(text.contains("'z'"));
        assert_eq!(err.diagnostics().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_aborted_carries_nothing() {
        assert!(Error::Aborted.is_aborted());
        assert!(Error::Aborted.diagnostics().is_none());
        assert!(!Error::internal("boom").is_aborted());
    }
}
