//! Token buffer shared by the loader.
//!
//! Pulls tokens lazily from the [`Lexer`] into a small ring buffer so the
//! grammar can look a few tokens ahead, and provides the `expect`-style
//! helpers that record a diagnostic and unwind with [`Error::Aborted`].

use crate::diag::{DiagnosticCode, LoadingContext, TextSpan};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{Error, Result};
use std::collections::VecDeque;
use tracing::trace;

/// Upper bound (exclusive) on the lookahead distance passed to [`Cursor::peek`].
pub(crate) const LOOKAHEAD: usize = 8;

pub(crate) struct Cursor<'a, 'c> {
    lexer: Lexer<'a>,
    ctx: &'c mut LoadingContext,
    buffer: VecDeque<Token>,
    last_span: TextSpan,
}

impl<'a, 'c> Cursor<'a, 'c> {
    pub(crate) fn new(lexer: Lexer<'a>, ctx: &'c mut LoadingContext) -> Self {
        Cursor {
            lexer,
            ctx,
            buffer: VecDeque::with_capacity(LOOKAHEAD),
            last_span: TextSpan::default(),
        }
    }

    pub(crate) fn ctx(&mut self) -> &mut LoadingContext {
        self.ctx
    }

    fn fill(&mut self, k: usize) -> Result<()> {
        while self.buffer.len() <= k {
            let token = self.lexer.next_token(self.ctx)?;
            self.buffer.push_back(token);
        }
        Ok(())
    }

    /// Returns the token `k` positions ahead without consuming anything.
    pub(crate) fn peek(&mut self, k: usize) -> Result<&Token> {
        debug_assert!(k < LOOKAHEAD, "lookahead {} exceeds buffer", k);
        self.fill(k)?;
        self.buffer
            .get(k)
            .ok_or_else(|| Error::internal("token buffer underflow"))
    }

    pub(crate) fn peek_kind(&mut self, k: usize) -> Result<TokenKind> {
        Ok(self.peek(k)?.kind)
    }

    pub(crate) fn consume(&mut self) -> Result<Token> {
        self.fill(0)?;
        let token = self
            .buffer
            .pop_front()
            .ok_or_else(|| Error::internal("token buffer underflow"))?;
        trace!(kind = %token.kind, "consume");
        self.last_span = token.span.clone();
        Ok(token)
    }

    /// Span of the most recently consumed token.
    pub(crate) fn last_span(&self) -> &TextSpan {
        &self.last_span
    }

    /// Records an error diagnostic and returns the unwind signal.
    pub(crate) fn error(&mut self, code: DiagnosticCode, message: impl Into<String>, span: TextSpan) -> Error {
        self.ctx.add_error(code, message, span);
        Error::Aborted
    }

    /// Consumes the next token if it is the punctuation `ch`.
    pub(crate) fn token(&mut self, ch: char) -> Result<Option<Token>> {
        self.token_kind(TokenKind::Punct(ch))
    }

    pub(crate) fn token_kind(&mut self, kind: TokenKind) -> Result<Option<Token>> {
        if self.peek_kind(0)? == kind {
            self.consume().map(Some)
        } else {
            Ok(None)
        }
    }

    pub(crate) fn token_expected(&mut self, ch: char) -> Result<Token> {
        self.token_kind_expected(TokenKind::Punct(ch))
    }

    pub(crate) fn token_kind_expected(&mut self, kind: TokenKind) -> Result<Token> {
        match self.token_kind(kind)? {
            Some(token) => Ok(token),
            None => {
                let span = self.peek(0)?.span.clone();
                Err(self.error(DiagnosticCode::TokenExpected, format!("{} expected.", kind), span))
            }
        }
    }

    /// Consumes the next token if it is a normal or verbatim identifier.
    pub(crate) fn identifier(&mut self) -> Result<Option<Token>> {
        if self.peek(0)?.is_identifier() {
            self.consume().map(Some)
        } else {
            Ok(None)
        }
    }

    pub(crate) fn identifier_expected(&mut self) -> Result<Token> {
        match self.identifier()? {
            Some(token) => Ok(token),
            None => {
                let span = self.peek(0)?.span.clone();
                Err(self.error(DiagnosticCode::IdentifierExpected, "Identifier expected.", span))
            }
        }
    }

    pub(crate) fn string_expected(&mut self) -> Result<Token> {
        if self.peek(0)?.is_string() {
            return self.consume();
        }
        let span = self.peek(0)?.span.clone();
        Err(self.error(DiagnosticCode::StringValueExpected, "String value expected.", span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut ctx = LoadingContext::new();
        let mut cursor = Cursor::new(Lexer::new("a :: b", None), &mut ctx);
        assert_eq!(cursor.peek_kind(1).unwrap(), TokenKind::ColonColon);
        assert_eq!(cursor.peek_kind(3).unwrap(), TokenKind::Eof);
        assert_eq!(cursor.consume().unwrap().text(), "a");
        assert_eq!(cursor.peek_kind(0).unwrap(), TokenKind::ColonColon);
    }

    #[test]
    fn test_optional_token() {
        let mut ctx = LoadingContext::new();
        let mut cursor = Cursor::new(Lexer::new("{ x", None), &mut ctx);
        assert!(cursor.token('}').unwrap().is_none());
        assert!(cursor.token('{').unwrap().is_some());
        assert_eq!(cursor.identifier().unwrap().unwrap().text(), "x");
        assert!(cursor.identifier().unwrap().is_none());
    }

    #[test]
    fn test_expected_records_diagnostic() {
        let mut ctx = LoadingContext::new();
        {
            let mut cursor = Cursor::new(Lexer::new("  = ", None), &mut ctx);
            let err = cursor.token_expected('{').unwrap_err();
            assert!(err.is_aborted());
        }
        let diagnostic = &ctx.diagnostics()[0];
        assert_eq!(diagnostic.code, DiagnosticCode::TokenExpected);
        assert_eq!(diagnostic.message, "'{' expected.");
        assert_eq!(diagnostic.span.start.column, 3);
    }

    #[test]
    fn test_string_expected() {
        let mut ctx = LoadingContext::new();
        {
            let mut cursor = Cursor::new(Lexer::new("@\"u\" x", None), &mut ctx);
            assert_eq!(cursor.string_expected().unwrap().text(), "u");
            assert!(cursor.string_expected().is_err());
        }
        assert_eq!(ctx.diagnostics()[0].code, DiagnosticCode::StringValueExpected);
    }
}
