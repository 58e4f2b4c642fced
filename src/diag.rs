//! Source positions, diagnostics and the per-session loading context.
//!
//! Every token produced by the [`Lexer`](crate::lexer::Lexer) and every
//! [`Diagnostic`] carries a [`TextSpan`]. Positions are 1-based so they can be
//! shown to people as-is.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A 1-based line/column pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextPosition {
    pub line: u32,
    pub column: u32,
}

impl TextPosition {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        TextPosition { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// An immutable region of a document.
///
/// `start_index` and `length` are byte offsets into the source text; `start`
/// and `end` are the human-facing positions of the first and last character.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextSpan {
    pub file_path: Option<Arc<str>>,
    pub start_index: usize,
    pub length: usize,
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextSpan {
    #[must_use]
    pub fn new(
        file_path: Option<Arc<str>>,
        start_index: usize,
        length: usize,
        start: TextPosition,
        end: TextPosition,
    ) -> Self {
        TextSpan {
            file_path,
            start_index,
            length,
            start,
            end,
        }
    }

    /// Returns a span covering `self` through `other`.
    ///
    /// `other` is expected to end at or after `self`.
    #[must_use]
    pub fn to(&self, other: &TextSpan) -> TextSpan {
        let end_index = (other.start_index + other.length).max(self.start_index + self.length);
        TextSpan {
            file_path: self.file_path.clone(),
            start_index: self.start_index,
            length: end_index - self.start_index,
            start: self.start,
            end: other.end,
        }
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.file_path {
            write!(f, "{}", path)?;
        }
        write!(f, "{}", self.start)
    }
}

/// Severity level for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Identifies what went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    // Lexical
    AsteriskSlashExpected,
    DoubleQuoteExpected,
    SingleQuoteExpected,
    CharValueExpected,
    InvalidEscapeSequence,
    InvalidNumber,

    // Syntactic
    IdentifierExpected,
    StringValueExpected,
    TokenExpected,
    ValueExpected,
    SpecificValueExpected,

    // Semantic
    DuplicateAlias,
    InvalidUriReference,
    InvalidClassReference,
    ClassNotEqualToOrDeriveFromTheDeclared,
    ClassIsAbstract,
    DuplicatePropertyName,
    InvalidPropertyName,
    PropertyMissing,
    NullNotAllowed,
    InvalidAtomValue,
    InvalidEnumReference,
    EnumNotEqualToTheDeclared,
    InvalidEnumMemberName,
    DuplicateSetItem,
    DuplicateMapKey,
}

impl DiagnosticCode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::AsteriskSlashExpected => "AsteriskSlashExpected",
            DiagnosticCode::DoubleQuoteExpected => "DoubleQuoteExpected",
            DiagnosticCode::SingleQuoteExpected => "SingleQuoteExpected",
            DiagnosticCode::CharValueExpected => "CharValueExpected",
            DiagnosticCode::InvalidEscapeSequence => "InvalidEscapeSequence",
            DiagnosticCode::InvalidNumber => "InvalidNumber",
            DiagnosticCode::IdentifierExpected => "IdentifierExpected",
            DiagnosticCode::StringValueExpected => "StringValueExpected",
            DiagnosticCode::TokenExpected => "TokenExpected",
            DiagnosticCode::ValueExpected => "ValueExpected",
            DiagnosticCode::SpecificValueExpected => "SpecificValueExpected",
            DiagnosticCode::DuplicateAlias => "DuplicateAlias",
            DiagnosticCode::InvalidUriReference => "InvalidUriReference",
            DiagnosticCode::InvalidClassReference => "InvalidClassReference",
            DiagnosticCode::ClassNotEqualToOrDeriveFromTheDeclared => {
                "ClassNotEqualToOrDeriveFromTheDeclared"
            }
            DiagnosticCode::ClassIsAbstract => "ClassIsAbstract",
            DiagnosticCode::DuplicatePropertyName => "DuplicatePropertyName",
            DiagnosticCode::InvalidPropertyName => "InvalidPropertyName",
            DiagnosticCode::PropertyMissing => "PropertyMissing",
            DiagnosticCode::NullNotAllowed => "NullNotAllowed",
            DiagnosticCode::InvalidAtomValue => "InvalidAtomValue",
            DiagnosticCode::InvalidEnumReference => "InvalidEnumReference",
            DiagnosticCode::EnumNotEqualToTheDeclared => "EnumNotEqualToTheDeclared",
            DiagnosticCode::InvalidEnumMemberName => "InvalidEnumMemberName",
            DiagnosticCode::DuplicateSetItem => "DuplicateSetItem",
            DiagnosticCode::DuplicateMapKey => "DuplicateMapKey",
        }
    }

    /// Lexical and syntactic codes; everything else is a schema-level problem.
    #[must_use]
    pub const fn is_syntactic(&self) -> bool {
        matches!(
            self,
            DiagnosticCode::AsteriskSlashExpected
                | DiagnosticCode::DoubleQuoteExpected
                | DiagnosticCode::SingleQuoteExpected
                | DiagnosticCode::CharValueExpected
                | DiagnosticCode::InvalidEscapeSequence
                | DiagnosticCode::InvalidNumber
                | DiagnosticCode::IdentifierExpected
                | DiagnosticCode::StringValueExpected
                | DiagnosticCode::TokenExpected
                | DiagnosticCode::ValueExpected
        )
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured report produced during a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: TextSpan,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: TextSpan,
    ) -> Self {
        Diagnostic {
            severity,
            code,
            message: message.into(),
            span,
        }
    }

    #[must_use]
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: TextSpan) -> Self {
        Self::new(Severity::Error, code, message, span)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.span, self.severity, self.code, self.message
        )
    }
}

/// Accumulates diagnostics for one load or save session.
///
/// Created by the caller before the session, read after it. The list is
/// ordered by the time each diagnostic was raised.
#[derive(Clone, Debug, Default)]
pub struct LoadingContext {
    diagnostics: Vec<Diagnostic>,
}

impl LoadingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn add_error(&mut self, code: DiagnosticCode, message: impl Into<String>, span: TextSpan) {
        self.add(Diagnostic::error(code, message, span));
    }

    pub fn add_warning(&mut self, code: DiagnosticCode, message: impl Into<String>, span: TextSpan) {
        self.add(Diagnostic::new(Severity::Warning, code, message, span));
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Clears the list so the context can serve another session.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_at(line: u32, column: u32, start_index: usize, length: usize) -> TextSpan {
        TextSpan::new(
            Some(Arc::from("doc.sdata")),
            start_index,
            length,
            TextPosition::new(line, column),
            TextPosition::new(line, column + length as u32 - 1),
        )
    }

    #[test]
    fn test_span_to_covers_both() {
        let a = span_at(1, 3, 2, 1);
        let b = span_at(1, 8, 7, 2);
        let joined = a.to(&b);
        assert_eq!(joined.start_index, 2);
        assert_eq!(joined.length, 7);
        assert_eq!(joined.start, TextPosition::new(1, 3));
        assert_eq!(joined.end, TextPosition::new(1, 9));
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::error(
            DiagnosticCode::NullNotAllowed,
            "Null not allowed.",
            span_at(4, 7, 30, 4),
        );
        assert_eq!(
            diagnostic.to_string(),
            "doc.sdata(4,7): error NullNotAllowed: Null not allowed."
        );
    }

    #[test]
    fn test_context_tracks_errors_only() {
        let mut ctx = LoadingContext::new();
        ctx.add_warning(DiagnosticCode::InvalidPropertyName, "ignored", span_at(1, 1, 0, 1));
        assert!(!ctx.has_errors());
        ctx.add_error(DiagnosticCode::ValueExpected, "Value expected.", span_at(1, 2, 1, 1));
        assert!(ctx.has_errors());
        assert_eq!(ctx.errors().count(), 1);
        assert_eq!(ctx.diagnostics().len(), 2);
        ctx.reset();
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_codes_partition() {
        assert!(DiagnosticCode::TokenExpected.is_syntactic());
        assert!(!DiagnosticCode::DuplicateMapKey.is_syntactic());
        assert_eq!(DiagnosticCode::ClassIsAbstract.to_string(), "ClassIsAbstract");
    }
}
