//! # sdata
//!
//! A loader and saver for SData, a schema-validated, human-readable text
//! format for object graphs.
//!
//! ## What is SData?
//!
//! An SData document describes one object: a class value with named
//! properties whose values are atoms, nested class values, enum members,
//! lists, sets and maps. A metadata universe of classes and enums says what
//! each property may hold. The loader checks a document against it while
//! parsing; the saver writes a graph back in a canonical form that loads to an
//! equal graph.
//!
//! ## Key Features
//!
//! - **Schema-directed**: type indicators, abstract classes, required and
//!   nullable properties, enum identity and duplicate detection are all
//!   checked while parsing
//! - **Untyped mode**: the same grammar reads documents without metadata
//! - **Exact atoms**: every scalar kind, from `Decimal` to `DateTimeOffset`,
//!   survives a save/load round trip unchanged
//! - **Structured diagnostics**: every problem carries a code, a message and
//!   a source span
//!
//! ## Quick Start
//!
//! ### Typed documents
//!
//! ```rust
//! use sdata::{from_str, to_string, AtomKind, ClassMetadata, FullName, LocalType, Metadata};
//!
//! let point = FullName::new("urn:geo", "Point");
//! let metadata = Metadata::builder()
//!     .class(
//!         ClassMetadata::new(point.clone())
//!             .property("x", LocalType::Atom(AtomKind::Int32))
//!             .property("y", LocalType::Atom(AtomKind::Int32))
//!             .property("label", LocalType::nullable(LocalType::Atom(AtomKind::String))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let value = from_str("{ x = 1, y = 2 }", &metadata, &point).unwrap();
//! assert_eq!(value.get("y").and_then(|v| v.as_i64()), Some(2));
//! assert!(value.get("label").unwrap().is_null());
//!
//! let text = to_string(&value, &metadata).unwrap();
//! assert_eq!(from_str(&text, &metadata, &point).unwrap(), value);
//! ```
//!
//! ### Untyped documents
//!
//! ```rust
//! use sdata::{from_str_untyped, to_string_untyped};
//!
//! let value = from_str_untyped("{ name = \"Ann\", tags = [@\"a\", @\"b\"] }").unwrap();
//! assert_eq!(value.get("tags").and_then(|v| v.len()), Some(2));
//!
//! let text = to_string_untyped(&value).unwrap();
//! assert_eq!(from_str_untyped(&text).unwrap(), value);
//! ```
//!
//! ### Diagnostics
//!
//! ```rust
//! use sdata::{from_str_untyped, DiagnosticCode, Error};
//!
//! let err = from_str_untyped("{ a = 1,\n  a = 2 }").unwrap_err();
//! let diagnostics = err.diagnostics().unwrap();
//! assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicatePropertyName);
//! assert_eq!(diagnostics[0].span.start.line, 2);
//! ```
//!
//! ## Logging
//!
//! Load and save sessions emit [`tracing`](https://docs.rs/tracing) events:
//! session outcomes at `debug`, alias allocation and token consumption at
//! `trace`. The crate installs no subscriber.
//!
//! ## Format Reference
//!
//! See the [`syntax`] module.

pub mod atom;
pub(crate) mod cursor;
pub mod de;
pub mod diag;
pub mod error;
pub mod lexer;
pub mod map;
pub mod metadata;
pub mod options;
pub mod ser;
pub mod syntax;
pub mod value;

pub use atom::{Atom, AtomKind, Decimal};
pub use de::{AliasUri, Loader};
pub use diag::{Diagnostic, DiagnosticCode, LoadingContext, Severity, TextPosition, TextSpan};
pub use error::{Error, Result};
pub use map::PropertyMap;
pub use metadata::{
    ClassMetadata, EnumMetadata, FullName, LoadHook, LocalType, Metadata, MetadataBuilder,
    PropertyMetadata,
};
pub use options::{LoadOptions, SaveOptions};
pub use ser::Saver;
pub use value::{EnumValue, Object, UntypedEnumMember, UntypedObject, Value};

use std::io;

fn load_session(
    text: &str,
    metadata: Option<&Metadata>,
    class: Option<&FullName>,
    options: LoadOptions,
) -> Result<Value> {
    let mut ctx = LoadingContext::new();
    let result = Loader::new(metadata)
        .with_options(options)
        .load(text, class, &mut ctx);
    match result {
        Err(Error::Aborted) => Err(Error::Load(ctx.take_diagnostics())),
        other => other,
    }
}

/// Loads a typed document whose root is declared as `class`.
///
/// # Examples
///
/// ```rust
/// use sdata::{from_str, AtomKind, ClassMetadata, FullName, LocalType, Metadata};
///
/// let name = FullName::new("urn:x", "Counter");
/// let metadata = Metadata::builder()
///     .class(ClassMetadata::new(name.clone()).property("n", LocalType::Atom(AtomKind::Int64)))
///     .build()
///     .unwrap();
///
/// let value = from_str("{ n = 41 }", &metadata, &name).unwrap();
/// assert_eq!(value.get("n").and_then(|v| v.as_i64()), Some(41));
/// ```
///
/// # Errors
///
/// [`Error::Load`] with every recorded diagnostic if the document is
/// malformed or does not match the metadata; [`Error::InvalidMetadata`] if
/// `class` is not in `metadata`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(text: &str, metadata: &Metadata, class: &FullName) -> Result<Value> {
    from_str_with_options(text, metadata, class, LoadOptions::default())
}

/// Loads a typed document with custom options.
///
/// # Errors
///
/// See [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(
    text: &str,
    metadata: &Metadata,
    class: &FullName,
    options: LoadOptions,
) -> Result<Value> {
    load_session(text, Some(metadata), Some(class), options)
}

/// Loads a document without metadata into an untyped graph.
///
/// # Errors
///
/// [`Error::Load`] if the document is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_untyped(text: &str) -> Result<Value> {
    from_str_untyped_with_options(text, LoadOptions::default())
}

/// Loads an untyped document with custom options.
///
/// # Errors
///
/// [`Error::Load`] if the document is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_untyped_with_options(text: &str, options: LoadOptions) -> Result<Value> {
    load_session(text, None, None, options)
}

/// Loads a typed document from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use sdata::{from_reader, ClassMetadata, FullName, Metadata};
/// use std::io::Cursor;
///
/// let name = FullName::new("urn:x", "Empty");
/// let metadata = Metadata::builder().class(ClassMetadata::new(name.clone())).build().unwrap();
///
/// let value = from_reader(Cursor::new(b"{ }"), &metadata, &name).unwrap();
/// assert!(value.as_object().is_some());
/// ```
///
/// # Errors
///
/// [`Error::Io`] if reading fails, otherwise as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R, metadata: &Metadata, class: &FullName) -> Result<Value>
where
    R: io::Read,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&text, metadata, class)
}

/// Loads a typed document from UTF-8 bytes.
///
/// # Errors
///
/// [`Error::Io`] if the bytes are not valid UTF-8, otherwise as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(bytes: &[u8], metadata: &Metadata, class: &FullName) -> Result<Value> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::io(&e.to_string()))?;
    from_str(text, metadata, class)
}

/// Saves a typed graph as a pretty-printed document.
///
/// # Errors
///
/// [`Error::InvalidValue`] if `value` does not match `metadata`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(value: &Value, metadata: &Metadata) -> Result<String> {
    to_string_with_options(value, metadata, SaveOptions::default())
}

/// Saves a typed graph with custom options.
///
/// # Examples
///
/// ```rust
/// use sdata::{to_string_with_options, ClassMetadata, FullName, Metadata, Object, SaveOptions, Value};
///
/// let name = FullName::new("urn:x", "Empty");
/// let metadata = Metadata::builder().class(ClassMetadata::new(name.clone())).build().unwrap();
///
/// let text = to_string_with_options(&Value::from(Object::new(name)), &metadata, SaveOptions::compact()).unwrap();
/// assert_eq!(text, "<a0 = @\"urn:x\"> (a0::Empty) {}");
/// ```
///
/// # Errors
///
/// [`Error::InvalidValue`] if `value` does not match `metadata`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(value: &Value, metadata: &Metadata, options: SaveOptions) -> Result<String> {
    Saver::new(Some(metadata)).with_options(options).save(value)
}

/// Saves an untyped graph as a pretty-printed document.
///
/// # Errors
///
/// [`Error::InvalidValue`] if the root is not a class value or a name is not
/// a valid identifier.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_untyped(value: &Value) -> Result<String> {
    to_string_untyped_with_options(value, SaveOptions::default())
}

/// Saves an untyped graph with custom options.
///
/// # Errors
///
/// See [`to_string_untyped`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_untyped_with_options(value: &Value, options: SaveOptions) -> Result<String> {
    Saver::new(None).with_options(options).save(value)
}

/// Saves a typed graph to a writer.
///
/// # Errors
///
/// [`Error::Io`] if writing fails, otherwise as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, value: &Value, metadata: &Metadata) -> Result<()>
where
    W: io::Write,
{
    to_writer_with_options(writer, value, metadata, SaveOptions::default())
}

/// Saves a typed graph to a writer with custom options.
///
/// # Errors
///
/// [`Error::Io`] if writing fails, otherwise as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W>(
    mut writer: W,
    value: &Value,
    metadata: &Metadata,
    options: SaveOptions,
) -> Result<()>
where
    W: io::Write,
{
    let text = to_string_with_options(value, metadata, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}
