//! SData Text Format
//!
//! This module documents the document format read by [`Loader`](crate::Loader)
//! and written by [`Saver`](crate::Saver).
//!
//! # Overview
//!
//! An SData document is one *class value*: a brace-delimited list of
//! `name = value` properties, optionally preceded by an alias scope and a type
//! indicator. Documents are checked against a metadata universe of classes and
//! enums, or read without one into an untyped graph.
//!
//! ```text
//! <a0 = @"http://example.com/shop">
//! (a0::Order) {
//!     id = 1042,
//!     placed = "2024-05-01T09:30:00.0000000+02:00",
//!     status = a0::Status.Shipped,
//!     lines = [
//!         { sku = @"A-1", quantity = 2, price = 9.95 },
//!         { sku = @"B-7", quantity = 1, price = 120.00 }
//!     ],
//!     notes = null
//! }
//! ```
//!
//! # Grammar
//!
//! ```text
//! ClassValue    := [AliasScope] [TypeIndicator] '{' (Prop (',' Prop)*)? '}'
//! AliasScope    := '<' Ident '=' String (',' Ident '=' String)* '>'
//! TypeIndicator := '(' Ident '::' Ident ')'
//! Prop          := Ident '=' Local
//! Local         := 'null' | Atom | ClassValue | EnumRef | ListOrSet | Map
//! EnumRef       := Ident '::' Ident '.' Ident
//! ListOrSet     := '[' (Local (',' Local)*)? ']'
//! Map           := '#[' (Local '=' Local (',' Local '=' Local)*)? ']'
//! ```
//!
//! A trailing comma before `}` or `]` is accepted.
//!
//! # Lexical Rules
//!
//! ## Identifiers
//!
//! Identifiers start with a Unicode letter or `_` and continue with letters,
//! digits, connector, combining and format characters. Prefixing `@` makes a
//! *verbatim identifier*, which is never a keyword: `@null = 1` declares a
//! property named `null`.
//!
//! ## Strings and chars
//!
//! | Form | Example | Notes |
//! |------|---------|-------|
//! | Normal string | `"a\tb"` | escapes: `\n \t \r \\ \" \' \0 \a \b \f \v \uXXXX \UXXXXXXXX`; must close on the same line |
//! | Verbatim string | `@"C:\dir"` | no escapes, `""` is a quote, may span lines |
//! | Char | `'x'`, `'\u00E9'` | exactly one character |
//!
//! ## Numbers
//!
//! | Token | Example | Untyped kind |
//! |-------|---------|--------------|
//! | Integer | `42`, `-7`, `+3` | `Int64`, or `UInt64` when too large |
//! | Decimal | `1.50`, `-.5` | `Decimal` |
//! | Real | `1e10`, `2.5E-3` | `Double` |
//!
//! ## Comments
//!
//! `// line` and `/* block */` comments are allowed wherever whitespace is.
//! An unterminated block comment is an error.
//!
//! # Atoms
//!
//! A typed atom property accepts any atom token and parses its text with the
//! declared kind's codec, so `"42"` and `42` are both valid for an `Int32`.
//! The saver writes each kind in one canonical form:
//!
//! | Kind | Written as |
//! |------|------------|
//! | `String`, `IgnoreCaseString` | verbatim string |
//! | `Char` | `'\uXXXX'` (`'\UXXXXXXXX'` above U+FFFF) |
//! | integers, `Decimal`, `Boolean` | bare literal |
//! | `Double`, `Single` | exponent form (`1.5e10`); `"INF"`, `"-INF"`, `"NaN"` quoted |
//! | `Binary` | quoted lowercase hex |
//! | `Guid` | quoted hyphenated hex |
//! | `TimeSpan` | quoted `[-][d.]hh:mm:ss[.fffffff]` |
//! | `DateTimeOffset` | quoted `yyyy-MM-ddTHH:mm:ss.fffffff+hh:mm` |
//!
//! Parsing the written form always gives back an equal value.
//!
//! # Aliases and Type Indicators
//!
//! An alias scope binds short names to namespace URIs for the class value it
//! precedes and everything nested inside it. Lookup goes from the innermost
//! scope outward, so an inner scope may shadow an outer alias. A type
//! indicator `(alias::Name)` names the runtime class; it must be the declared
//! class or derive from it, and must not be abstract. Enum members are
//! referenced as `alias::Enum.Member`.
//!
//! # Collections
//!
//! - **List**: ordered, duplicates allowed
//! - **Simple set**: atoms or enum members, no duplicates
//! - **Object set**: class values, unique by a key selector property path
//! - **Map**: `#[key = value, ...]`, keys are atoms or enum members, no duplicates
//!
//! # Validation
//!
//! Loading stops at the first error, with one exception: after a class value's
//! closing `}` every missing non-nullable property is reported before the
//! load fails. Missing nullable properties are filled with `null`.

// This module contains only documentation; no implementation code
