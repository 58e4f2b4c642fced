//! Character-level lexer.
//!
//! Turns document text into [`Token`]s one at a time. The lexer reads its
//! input through a small character buffer refilled in fixed-size chunks, so
//! lookahead never exceeds a couple of characters and never scans ahead of
//! the token being built.
//!
//! ## Token forms
//!
//! | Input | Token |
//! |-------|-------|
//! | `name`, `_x1`, `名前` | [`TokenKind::Identifier`] |
//! | `@null` | [`TokenKind::VerbatimIdentifier`] (text `null`) |
//! | `"a\tb"` | [`TokenKind::String`] |
//! | `@"C:\dir"` | [`TokenKind::VerbatimString`] (`""` is an embedded quote) |
//! | `'c'`, `'\u0041'` | [`TokenKind::Char`] |
//! | `42`, `-7` | [`TokenKind::Integer`] |
//! | `1.5`, `-.5` | [`TokenKind::Decimal`] |
//! | `1e10`, `2.5E-3` | [`TokenKind::Real`] |
//! | `::` | [`TokenKind::ColonColon`] |
//! | `#[` | [`TokenKind::HashOpenBracket`] |
//! | anything else | [`TokenKind::Punct`] |
//!
//! `//` and `/* */` comments and all whitespace are skipped.

use crate::diag::{DiagnosticCode, LoadingContext, TextPosition, TextSpan};
use crate::{Error, Result};
use std::fmt;
use std::str::Chars;
use std::sync::Arc;

/// Number of characters pulled from the source per refill.
const CHUNK_SIZE: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    VerbatimIdentifier,
    String,
    VerbatimString,
    Char,
    Integer,
    Decimal,
    Real,
    /// `::`
    ColonColon,
    /// `#[`
    HashOpenBracket,
    Punct(char),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::VerbatimIdentifier => write!(f, "verbatim identifier"),
            TokenKind::String => write!(f, "string"),
            TokenKind::VerbatimString => write!(f, "verbatim string"),
            TokenKind::Char => write!(f, "char"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Decimal => write!(f, "decimal"),
            TokenKind::Real => write!(f, "real number"),
            TokenKind::ColonColon => write!(f, "'::'"),
            TokenKind::HashOpenBracket => write!(f, "'#['"),
            TokenKind::Punct(ch) => write!(f, "'{}'", ch),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Option<String>,
    pub span: TextSpan,
}

impl Token {
    /// The token text, or `""` for punctuation and end of file.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Normal or verbatim identifier.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::VerbatimIdentifier
        )
    }

    /// A normal (not `@`-escaped) identifier spelled `keyword`.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text() == keyword
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::String | TokenKind::VerbatimString)
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Read-ahead window over a `Chars` stream.
struct CharBuffer<'a> {
    source: Chars<'a>,
    buf: Vec<char>,
    pos: usize,
}

impl<'a> CharBuffer<'a> {
    fn new(source: Chars<'a>) -> Self {
        CharBuffer {
            source,
            buf: Vec::with_capacity(CHUNK_SIZE),
            pos: 0,
        }
    }

    fn peek(&mut self, offset: usize) -> Option<char> {
        if self.pos + offset >= self.buf.len() {
            self.refill();
        }
        self.buf.get(self.pos + offset).copied()
    }

    fn refill(&mut self) {
        self.buf.drain(..self.pos);
        self.pos = 0;
        self.buf.extend(self.source.by_ref().take(CHUNK_SIZE));
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek(0)?;
        self.pos += 1;
        Some(ch)
    }
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

pub(crate) fn is_identifier_start(ch: char) -> bool {
    if ch.is_ascii() {
        ch.is_ascii_alphabetic() || ch == '_'
    } else {
        ch.is_alphabetic()
    }
}

pub(crate) fn is_identifier_part(ch: char) -> bool {
    if ch.is_ascii() {
        ch.is_ascii_alphanumeric() || ch == '_'
    } else {
        // Zero-width joiner/non-joiner are the format characters names use.
        ch.is_alphanumeric() || ch == '\u{200C}' || ch == '\u{200D}'
    }
}

/// The character-level lexer.
pub struct Lexer<'a> {
    chars: CharBuffer<'a>,
    file_path: Option<Arc<str>>,
    /// Byte offset of the next character.
    index: usize,
    /// Position of the next character.
    position: TextPosition,
    /// Position of the last consumed character.
    last: TextPosition,
    mark_index: usize,
    mark_position: TextPosition,
    scratch: String,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str, file_path: Option<Arc<str>>) -> Self {
        Lexer {
            chars: CharBuffer::new(text.chars()),
            file_path,
            index: 0,
            position: TextPosition::new(1, 1),
            last: TextPosition::new(1, 1),
            mark_index: 0,
            mark_position: TextPosition::new(1, 1),
            scratch: String::new(),
        }
    }

    fn peek(&mut self, offset: usize) -> Option<char> {
        self.chars.peek(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.advance()?;
        self.last = self.position;
        self.index += ch.len_utf8();
        let crlf = ch == '\r' && self.peek(0) == Some('\n');
        if is_newline(ch) && !crlf {
            self.position = TextPosition::new(self.position.line + 1, 1);
        } else {
            self.position.column += 1;
        }
        Some(ch)
    }

    fn advance_into_scratch(&mut self) {
        if let Some(ch) = self.advance() {
            self.scratch.push(ch);
        }
    }

    fn mark(&mut self) {
        self.mark_index = self.index;
        self.mark_position = self.position;
    }

    fn token_span(&self) -> TextSpan {
        let length = self.index - self.mark_index;
        let end = if length == 0 {
            self.mark_position
        } else {
            self.last
        };
        TextSpan::new(
            self.file_path.clone(),
            self.mark_index,
            length,
            self.mark_position,
            end,
        )
    }

    /// A one-character span at the next character (or zero-length at EOF).
    fn here_span(&mut self) -> TextSpan {
        let length = self.peek(0).map_or(0, char::len_utf8);
        TextSpan::new(
            self.file_path.clone(),
            self.index,
            length,
            self.position,
            self.position,
        )
    }

    fn token(&self, kind: TokenKind, text: Option<String>) -> Token {
        Token {
            kind,
            text,
            span: self.token_span(),
        }
    }

    fn scratch_token(&self, kind: TokenKind) -> Token {
        self.token(kind, Some(self.scratch.clone()))
    }

    fn error(&mut self, ctx: &mut LoadingContext, code: DiagnosticCode, message: &str) -> Error {
        let span = self.here_span();
        ctx.add_error(code, message, span);
        Error::Aborted
    }

    /// Returns the next token. Once the end of the input is reached every
    /// further call returns another [`TokenKind::Eof`] token.
    ///
    /// # Errors
    ///
    /// Records a diagnostic in `ctx` and returns [`Error::Aborted`] for
    /// malformed literals and unterminated comments.
    pub fn next_token(&mut self, ctx: &mut LoadingContext) -> Result<Token> {
        loop {
            self.mark();
            self.scratch.clear();
            let Some(ch) = self.peek(0) else {
                return Ok(self.token(TokenKind::Eof, None));
            };
            match ch {
                _ if ch.is_whitespace() => {
                    self.advance();
                }
                '/' => match self.peek(1) {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_delimited_comment(ctx)?,
                    _ => return Ok(self.punct()),
                },
                '@' => match self.peek(1) {
                    Some('"') => return self.verbatim_string(ctx),
                    Some(next) if is_identifier_start(next) => {
                        self.advance();
                        return Ok(self.identifier(TokenKind::VerbatimIdentifier));
                    }
                    _ => return Ok(self.punct()),
                },
                '"' => return self.string(ctx),
                '\'' => return self.char_literal(ctx),
                '-' | '+' => {
                    if self.number_follows(1) {
                        return self.number(ctx);
                    }
                    return Ok(self.punct());
                }
                '.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => return self.number(ctx),
                _ if ch.is_ascii_digit() => return self.number(ctx),
                ':' if self.peek(1) == Some(':') => {
                    self.advance();
                    self.advance();
                    return Ok(self.token(TokenKind::ColonColon, None));
                }
                '#' if self.peek(1) == Some('[') => {
                    self.advance();
                    self.advance();
                    return Ok(self.token(TokenKind::HashOpenBracket, None));
                }
                _ if is_identifier_start(ch) => return Ok(self.identifier(TokenKind::Identifier)),
                _ => return Ok(self.punct()),
            }
        }
    }

    fn punct(&mut self) -> Token {
        match self.advance() {
            Some(ch) => self.token(TokenKind::Punct(ch), None),
            None => self.token(TokenKind::Eof, None),
        }
    }

    /// Whether a digit, or `.` and a digit, starts at `offset`.
    fn number_follows(&mut self, offset: usize) -> bool {
        match self.peek(offset) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek(offset + 1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek(0) {
            if is_newline(ch) {
                break;
            }
            self.advance();
        }
    }

    fn skip_delimited_comment(&mut self, ctx: &mut LoadingContext) -> Result<()> {
        self.advance();
        self.advance();
        loop {
            match self.peek(0) {
                None => return Err(self.error(ctx, DiagnosticCode::AsteriskSlashExpected, "'*/' expected.")),
                Some('*') if self.peek(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn identifier(&mut self, kind: TokenKind) -> Token {
        self.advance_into_scratch();
        while self.peek(0).is_some_and(is_identifier_part) {
            self.advance_into_scratch();
        }
        self.scratch_token(kind)
    }

    fn number(&mut self, ctx: &mut LoadingContext) -> Result<Token> {
        let mut kind = TokenKind::Integer;
        if matches!(self.peek(0), Some('-' | '+')) {
            self.advance_into_scratch();
        }
        self.digits();
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::Decimal;
            self.advance_into_scratch();
            self.digits();
        }
        if matches!(self.peek(0), Some('e' | 'E')) {
            kind = TokenKind::Real;
            self.advance_into_scratch();
            if matches!(self.peek(0), Some('-' | '+')) {
                self.advance_into_scratch();
            }
            if !self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error(ctx, DiagnosticCode::InvalidNumber, "Exponent digit expected."));
            }
            self.digits();
        }
        Ok(self.scratch_token(kind))
    }

    fn digits(&mut self) {
        while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            self.advance_into_scratch();
        }
    }

    fn string(&mut self, ctx: &mut LoadingContext) -> Result<Token> {
        self.advance();
        loop {
            match self.peek(0) {
                Some('"') => {
                    self.advance();
                    return Ok(self.scratch_token(TokenKind::String));
                }
                Some('\\') => {
                    let ch = self.escape(ctx)?;
                    self.scratch.push(ch);
                }
                Some(ch) if !is_newline(ch) => self.advance_into_scratch(),
                _ => return Err(self.error(ctx, DiagnosticCode::DoubleQuoteExpected, "'\"' expected.")),
            }
        }
    }

    fn verbatim_string(&mut self, ctx: &mut LoadingContext) -> Result<Token> {
        self.advance();
        self.advance();
        loop {
            match self.peek(0) {
                Some('"') => {
                    if self.peek(1) == Some('"') {
                        self.advance();
                        self.advance_into_scratch();
                    } else {
                        self.advance();
                        return Ok(self.scratch_token(TokenKind::VerbatimString));
                    }
                }
                Some(_) => self.advance_into_scratch(),
                None => return Err(self.error(ctx, DiagnosticCode::DoubleQuoteExpected, "'\"' expected.")),
            }
        }
    }

    fn char_literal(&mut self, ctx: &mut LoadingContext) -> Result<Token> {
        self.advance();
        let ch = match self.peek(0) {
            Some('\\') => self.escape(ctx)?,
            Some(ch) if ch != '\'' && !is_newline(ch) => {
                self.advance();
                ch
            }
            _ => return Err(self.error(ctx, DiagnosticCode::CharValueExpected, "Character value expected.")),
        };
        if self.peek(0) != Some('\'') {
            return Err(self.error(ctx, DiagnosticCode::SingleQuoteExpected, "''' expected."));
        }
        self.advance();
        self.scratch.push(ch);
        Ok(self.scratch_token(TokenKind::Char))
    }

    /// Consumes a `\`-escape and returns the character it denotes.
    fn escape(&mut self, ctx: &mut LoadingContext) -> Result<char> {
        self.advance();
        let ch = match self.peek(0) {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('0') => '\0',
            Some('a') => '\u{7}',
            Some('b') => '\u{8}',
            Some('f') => '\u{C}',
            Some('v') => '\u{B}',
            Some('u') => {
                self.advance();
                let unit = self.hex_digits(ctx, 4)?;
                return self.utf16_unit(ctx, unit);
            }
            Some('U') => {
                self.advance();
                let code = self.hex_digits(ctx, 8)?;
                return char::from_u32(code).ok_or_else(|| {
                    self.error(ctx, DiagnosticCode::InvalidEscapeSequence, "Invalid character code.")
                });
            }
            _ => {
                return Err(self.error(
                    ctx,
                    DiagnosticCode::InvalidEscapeSequence,
                    "Invalid escape sequence.",
                ))
            }
        };
        self.advance();
        Ok(ch)
    }

    /// Completes a `\uXXXX` escape, pairing a high surrogate with the
    /// `\uXXXX` low surrogate that must follow it.
    fn utf16_unit(&mut self, ctx: &mut LoadingContext, unit: u32) -> Result<char> {
        if (0xD800..0xDC00).contains(&unit) {
            if self.peek(0) == Some('\\') && self.peek(1) == Some('u') {
                self.advance();
                self.advance();
                let low = self.hex_digits(ctx, 4)?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(ch) = char::from_u32(code) {
                        return Ok(ch);
                    }
                }
            }
            return Err(self.error(ctx, DiagnosticCode::InvalidEscapeSequence, "Unpaired surrogate."));
        }
        char::from_u32(unit)
            .ok_or_else(|| self.error(ctx, DiagnosticCode::InvalidEscapeSequence, "Unpaired surrogate."))
    }

    fn hex_digits(&mut self, ctx: &mut LoadingContext, count: usize) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            match self.peek(0).and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    value = (value << 4) | digit;
                    self.advance();
                }
                None => {
                    return Err(self.error(
                        ctx,
                        DiagnosticCode::InvalidEscapeSequence,
                        "Hexadecimal digit expected.",
                    ))
                }
            }
        }
        Ok(value)
    }
}
