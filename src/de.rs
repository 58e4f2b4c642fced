//! Document loading.
//!
//! This module provides [`Loader`], the grammar engine that turns document
//! text into a [`Value`] graph.
//!
//! ## Overview
//!
//! - **Single pass**: recursive descent over a token buffer with bounded
//!   lookahead, no backtracking
//! - **Metadata-directed**: with a [`Metadata`] universe every value is
//!   checked against its declared [`LocalType`]; without one the same grammar
//!   builds an untyped graph
//! - **Diagnostics**: problems are recorded in the caller's
//!   [`LoadingContext`] and the session stops at the first structural error
//!
//! ## Usage
//!
//! Most users should use the functions in the crate root:
//!
//! ```rust
//! use sdata::from_str_untyped;
//!
//! let value = from_str_untyped("<a = @\"urn:demo\"> (a::Point) { x = 1, y = 2 }").unwrap();
//! let point = value.as_untyped_object().unwrap();
//! assert_eq!(point.type_indicator.as_ref().map(|n| n.name.as_str()), Some("Point"));
//! assert_eq!(point.properties.len(), 2);
//! ```
//!
//! Driving a [`Loader`] directly leaves the diagnostics in a context the
//! caller owns, and lets one loader serve many documents:
//!
//! ```rust
//! use sdata::{Loader, LoadingContext};
//!
//! let mut loader = Loader::new(None);
//! let mut ctx = LoadingContext::new();
//! assert!(loader.load("{ a = [1, 2] }", None, &mut ctx).is_ok());
//!
//! ctx.reset();
//! assert!(loader.load("{ a = [1, 2 }", None, &mut ctx).is_err());
//! assert_eq!(ctx.diagnostics().len(), 1);
//! ```

use crate::atom::{Atom, AtomKind};
use crate::cursor::Cursor;
use crate::diag::{DiagnosticCode, LoadingContext, TextSpan};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::metadata::{ClassMetadata, FullName, LocalType, Metadata};
use crate::options::LoadOptions;
use crate::value::{EnumValue, UntypedEnumMember, UntypedObject, Value};
use crate::{Error, PropertyMap, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// An alias bound to a namespace URI by a `<alias = "uri", ...>` scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasUri {
    pub alias: String,
    pub uri: String,
}

/// Loads documents, optionally against a metadata universe.
///
/// A loader is reusable: each [`load`](Loader::load) call starts from a clean
/// alias stack.
#[derive(Debug)]
pub struct Loader<'m> {
    metadata: Option<&'m Metadata>,
    options: LoadOptions,
    alias_scopes: Vec<Vec<AliasUri>>,
}

impl<'m> Loader<'m> {
    /// A loader for typed documents when `metadata` is given, untyped
    /// documents otherwise.
    #[must_use]
    pub fn new(metadata: Option<&'m Metadata>) -> Self {
        Loader {
            metadata,
            options: LoadOptions::default(),
            alias_scopes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Loads one document whose root is a class value.
    ///
    /// With metadata, `class` names the declared root class and the result is
    /// a [`Value::Object`]. Without metadata `class` must be `None` and the
    /// result is a [`Value::UntypedObject`].
    ///
    /// On a malformed document the diagnostics are in `ctx` and the error is
    /// [`Error::Aborted`].
    #[tracing::instrument(level = "debug", skip_all, fields(file = ?self.options.file_path, typed = self.metadata.is_some()))]
    pub fn load(&mut self, text: &str, class: Option<&FullName>, ctx: &mut LoadingContext) -> Result<Value> {
        let root = match (self.metadata, class) {
            (Some(metadata), Some(name)) => Some(
                metadata
                    .class(name)
                    .ok_or_else(|| Error::invalid_metadata(format!("class {} is not defined", name)))?,
            ),
            (Some(_), None) => return Err(Error::invalid_metadata("a typed load needs a root class")),
            (None, Some(name)) => {
                return Err(Error::invalid_metadata(format!(
                    "root class {} given without metadata",
                    name
                )))
            }
            (None, None) => None,
        };

        let file_path: Option<Arc<str>> = self.options.file_path.as_deref().map(Arc::from);
        let mut scopes = std::mem::take(&mut self.alias_scopes);
        scopes.clear();
        let (result, mut scopes) = {
            let mut parser = Parser {
                cursor: Cursor::new(Lexer::new(text, file_path), ctx),
                metadata: self.metadata,
                scopes,
            };
            let result = parser.document(root);
            (result, parser.scopes)
        };
        scopes.clear();
        self.alias_scopes = scopes;

        match &result {
            Ok(_) => debug!("document loaded"),
            Err(err) => debug!(diagnostics = ctx.diagnostics().len(), error = %err, "document failed to load"),
        }
        result
    }
}

struct Parser<'a, 'c, 'm> {
    cursor: Cursor<'a, 'c>,
    metadata: Option<&'m Metadata>,
    scopes: Vec<Vec<AliasUri>>,
}

impl<'a, 'c, 'm> Parser<'a, 'c, 'm> {
    fn document(&mut self, root: Option<&'m ClassMetadata>) -> Result<Value> {
        let value = self.class_value(root)?;
        self.cursor.token_kind_expected(TokenKind::Eof)?;
        Ok(value)
    }

    fn universe(&self) -> Result<&'m Metadata> {
        self.metadata
            .ok_or_else(|| Error::internal("typed value requested without metadata"))
    }

    fn error(&mut self, code: DiagnosticCode, message: impl Into<String>, span: TextSpan) -> Error {
        self.cursor.error(code, message, span)
    }

    // ClassValue := [AliasScope] [TypeIndicator] '{' (Prop (',' Prop)*)? '}'
    fn class_value(&mut self, declared: Option<&'m ClassMetadata>) -> Result<Value> {
        match self.alias_scope()? {
            Some(scope) => {
                trace!(aliases = scope.len(), depth = self.scopes.len() + 1, "push alias scope");
                self.scopes.push(scope);
                let result = self.class_body(declared);
                self.scopes.pop();
                result
            }
            None => self.class_body(declared),
        }
    }

    fn alias_scope(&mut self) -> Result<Option<Vec<AliasUri>>> {
        if self.cursor.token('<')?.is_none() {
            return Ok(None);
        }
        let mut scope: Vec<AliasUri> = Vec::new();
        loop {
            let alias = self.cursor.identifier_expected()?;
            if scope.iter().any(|a| a.alias == alias.text()) {
                return Err(self.error(
                    DiagnosticCode::DuplicateAlias,
                    format!("Duplicate alias '{}'.", alias.text()),
                    alias.span,
                ));
            }
            self.cursor.token_expected('=')?;
            let uri = self.cursor.string_expected()?;
            scope.push(AliasUri {
                alias: alias.text().to_string(),
                uri: uri.text().to_string(),
            });
            if self.cursor.token(',')?.is_none() {
                break;
            }
        }
        self.cursor.token_expected('>')?;
        Ok(Some(scope))
    }

    fn resolve_alias(&mut self, alias: &Token) -> Result<String> {
        let found = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|a| a.alias == alias.text())
            .map(|a| a.uri.clone());
        match found {
            Some(uri) => Ok(uri),
            None => Err(self.error(
                DiagnosticCode::InvalidUriReference,
                format!("Invalid uri reference '{}'.", alias.text()),
                alias.span.clone(),
            )),
        }
    }

    // TypeIndicator := '(' Ident '::' Ident ')'
    fn type_indicator(&mut self) -> Result<Option<(FullName, TextSpan)>> {
        if self.cursor.token('(')?.is_none() {
            return Ok(None);
        }
        let alias = self.cursor.identifier_expected()?;
        self.cursor.token_kind_expected(TokenKind::ColonColon)?;
        let name = self.cursor.identifier_expected()?;
        self.cursor.token_expected(')')?;
        let uri = self.resolve_alias(&alias)?;
        Ok(Some((FullName::new(uri, name.text()), alias.span.to(&name.span))))
    }

    fn class_body(&mut self, declared: Option<&'m ClassMetadata>) -> Result<Value> {
        let indicator = self.type_indicator()?;
        match declared {
            None => self.untyped_class_body(indicator.map(|(name, _)| name)),
            Some(declared) => {
                let class = self.effective_class(declared, indicator)?;
                self.typed_class_body(class)
            }
        }
    }

    fn effective_class(
        &mut self,
        declared: &'m ClassMetadata,
        indicator: Option<(FullName, TextSpan)>,
    ) -> Result<&'m ClassMetadata> {
        let metadata = self.universe()?;
        let (class, span) = match indicator {
            Some((name, span)) => {
                let Some(class) = metadata.class(&name) else {
                    return Err(self.error(
                        DiagnosticCode::InvalidClassReference,
                        format!("Invalid class reference '{}'.", name),
                        span,
                    ));
                };
                if !metadata.is_equal_or_derive(&name, declared.full_name()) {
                    return Err(self.error(
                        DiagnosticCode::ClassNotEqualToOrDeriveFromTheDeclared,
                        format!(
                            "Class '{}' is not equal to or derive from the declared class '{}'.",
                            name,
                            declared.full_name()
                        ),
                        span,
                    ));
                }
                (class, span)
            }
            None => (declared, self.cursor.peek(0)?.span.clone()),
        };
        if class.is_abstract() {
            return Err(self.error(
                DiagnosticCode::ClassIsAbstract,
                format!("Class '{}' is abstract.", class.full_name()),
                span,
            ));
        }
        Ok(class)
    }

    fn typed_class_body(&mut self, class: &'m ClassMetadata) -> Result<Value> {
        let metadata = self.universe()?;
        let open = self.cursor.token_expected('{')?;
        let mut object = class.create_instance();
        let errors_before = self.cursor.ctx().errors().count();
        if !class.invoke_on_loading(&mut object, self.cursor.ctx()) {
            return Err(self.hook_failed(class, "on_loading", errors_before));
        }
        let collects_unknown = metadata.allows_unknown_properties(class.full_name());

        let mut seen = HashSet::new();
        while let Some(name) = self.cursor.identifier()? {
            if !seen.insert(name.text().to_string()) {
                return Err(self.duplicate_property(&name));
            }
            self.cursor.token_expected('=')?;
            match metadata.find_property(class.full_name(), name.text()) {
                Some(property) => {
                    let value = self.local_value(Some(property.ty()))?;
                    property.set_value(&mut object, value);
                }
                None if collects_unknown => {
                    let value = self.local_value(None)?;
                    object
                        .unknown_properties
                        .insert(name.text().to_string(), value);
                }
                None => {
                    return Err(self.error(
                        DiagnosticCode::InvalidPropertyName,
                        format!(
                            "Property '{}' does not exist in class '{}'.",
                            name.text(),
                            class.full_name()
                        ),
                        name.span,
                    ))
                }
            }
            if self.cursor.token(',')?.is_none() {
                break;
            }
        }
        let close = self.cursor.token_expected('}')?;

        // every missing property is reported before giving up
        let mut missing = false;
        for property in metadata.all_properties(class.full_name()) {
            if seen.contains(property.name()) {
                continue;
            }
            if property.ty().is_nullable() {
                property.set_value(&mut object, Value::Null);
            } else {
                missing = true;
                self.cursor.ctx().add_error(
                    DiagnosticCode::PropertyMissing,
                    format!("Property '{}' missing.", property.name()),
                    close.span.clone(),
                );
            }
        }
        if missing {
            return Err(Error::Aborted);
        }

        let errors_before = self.cursor.ctx().errors().count();
        if !class.invoke_on_loaded(&mut object, self.cursor.ctx()) {
            return Err(self.hook_failed(class, "on_loaded", errors_before));
        }
        trace!(class = %class.full_name(), span = %open.span, "class value loaded");
        Ok(Value::Object(object))
    }

    /// Only errors the hook itself recorded count as its diagnostic.
    fn hook_failed(&mut self, class: &ClassMetadata, hook: &str, errors_before: usize) -> Error {
        if self.cursor.ctx().errors().count() > errors_before {
            Error::Aborted
        } else {
            Error::internal(format!(
                "{} hook of {} failed without a diagnostic",
                hook,
                class.full_name()
            ))
        }
    }

    fn untyped_class_body(&mut self, type_indicator: Option<FullName>) -> Result<Value> {
        self.cursor.token_expected('{')?;
        let mut properties = PropertyMap::new();
        while let Some(name) = self.cursor.identifier()? {
            if properties.contains_key(name.text()) {
                return Err(self.duplicate_property(&name));
            }
            self.cursor.token_expected('=')?;
            let value = self.local_value(None)?;
            properties.insert(name.text().to_string(), value);
            if self.cursor.token(',')?.is_none() {
                break;
            }
        }
        self.cursor.token_expected('}')?;
        Ok(Value::UntypedObject(UntypedObject {
            type_indicator,
            properties,
        }))
    }

    fn duplicate_property(&mut self, name: &Token) -> Error {
        self.error(
            DiagnosticCode::DuplicatePropertyName,
            format!("Duplicate property name '{}'.", name.text()),
            name.span.clone(),
        )
    }

    fn local_value(&mut self, ty: Option<&LocalType>) -> Result<Value> {
        match self.local_value_opt(ty)? {
            Some(value) => Ok(value),
            None => {
                let span = self.cursor.peek(0)?.span.clone();
                Err(self.error(DiagnosticCode::ValueExpected, "Value expected.", span))
            }
        }
    }

    /// Parses a local value if the lookahead starts one.
    fn local_value_opt(&mut self, ty: Option<&LocalType>) -> Result<Option<Value>> {
        let token = self.cursor.peek(0)?;
        let kind = token.kind;
        let span = token.span.clone();
        let is_null = token.is_keyword("null");
        let is_bool = token.is_keyword("true") || token.is_keyword("false");
        let is_enum_reference = matches!(kind, TokenKind::Identifier | TokenKind::VerbatimIdentifier)
            && self.cursor.peek_kind(1)? == TokenKind::ColonColon;

        if is_null {
            self.cursor.consume()?;
            if let Some(ty) = ty {
                if !ty.is_nullable() {
                    return Err(self.error(DiagnosticCode::NullNotAllowed, "Null value not allowed.", span));
                }
            }
            return Ok(Some(Value::Null));
        }

        let ty = ty.map(LocalType::non_nullable);
        let value = match kind {
            TokenKind::String
            | TokenKind::VerbatimString
            | TokenKind::Char
            | TokenKind::Integer
            | TokenKind::Decimal
            | TokenKind::Real => self.atom_value(ty)?,
            TokenKind::Identifier if is_bool => self.atom_value(ty)?,
            TokenKind::Identifier | TokenKind::VerbatimIdentifier if is_enum_reference => {
                self.enum_reference(ty)?
            }
            TokenKind::Punct('(' | '{' | '<') => self.nested_class_value(ty, span)?,
            TokenKind::Punct('[') => self.list_or_set(ty)?,
            TokenKind::HashOpenBracket => self.map(ty)?,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn type_mismatch(&mut self, expected: &LocalType, span: TextSpan) -> Error {
        self.error(
            DiagnosticCode::SpecificValueExpected,
            format!("Value of type '{}' expected.", expected),
            span,
        )
    }

    fn atom_value(&mut self, ty: Option<&LocalType>) -> Result<Value> {
        let token = self.cursor.consume()?;
        match ty {
            None => self.untyped_atom(&token).map(Value::Atom),
            Some(LocalType::Atom(kind)) => self.parse_atom(*kind, &token).map(Value::Atom),
            Some(LocalType::Enum(name)) => {
                let enum_type = self.universe()?.enum_type(name).ok_or_else(|| {
                    Error::internal(format!("enum {} is not in the metadata", name))
                })?;
                let atom = self.parse_atom(enum_type.underlying(), &token)?;
                match enum_type.member_by_value(&atom) {
                    Some(member) => Ok(Value::Enum(EnumValue::new(name.clone(), member, atom))),
                    None => Err(self.error(
                        DiagnosticCode::InvalidEnumMemberName,
                        format!("Value '{}' is not a member of enum '{}'.", token.text(), name),
                        token.span,
                    )),
                }
            }
            Some(other) => Err(self.type_mismatch(other, token.span)),
        }
    }

    fn parse_atom(&mut self, kind: AtomKind, token: &Token) -> Result<Atom> {
        match kind.parse(token.text()) {
            Some(atom) => Ok(atom),
            None => Err(self.invalid_atom(kind, token)),
        }
    }

    fn invalid_atom(&mut self, kind: AtomKind, token: &Token) -> Error {
        self.error(
            DiagnosticCode::InvalidAtomValue,
            format!("Invalid atom value '{}' of type '{}'.", token.text(), kind),
            token.span.clone(),
        )
    }

    fn untyped_atom(&mut self, token: &Token) -> Result<Atom> {
        let text = token.text();
        let parsed = match token.kind {
            TokenKind::String | TokenKind::VerbatimString => Some(Atom::String(text.to_string())),
            TokenKind::Char => AtomKind::Char.parse(text),
            TokenKind::Integer => AtomKind::Int64
                .parse(text)
                .or_else(|| AtomKind::UInt64.parse(text)),
            TokenKind::Decimal => AtomKind::Decimal.parse(text),
            TokenKind::Real => AtomKind::Double.parse(text),
            _ => AtomKind::Boolean.parse(text),
        };
        match parsed {
            Some(atom) => Ok(atom),
            None => {
                let kind = match token.kind {
                    TokenKind::Integer => AtomKind::UInt64,
                    TokenKind::Decimal => AtomKind::Decimal,
                    TokenKind::Real => AtomKind::Double,
                    TokenKind::Char => AtomKind::Char,
                    _ => AtomKind::Boolean,
                };
                Err(self.invalid_atom(kind, token))
            }
        }
    }

    // EnumRef := Ident '::' Ident '.' Ident
    fn enum_reference(&mut self, ty: Option<&LocalType>) -> Result<Value> {
        let alias = self.cursor.consume()?;
        if let Some(expected) = ty {
            if !matches!(expected, LocalType::Enum(_)) {
                return Err(self.type_mismatch(expected, alias.span));
            }
        }
        self.cursor.token_kind_expected(TokenKind::ColonColon)?;
        let name = self.cursor.identifier_expected()?;
        self.cursor.token_expected('.')?;
        let member = self.cursor.identifier_expected()?;
        let uri = self.resolve_alias(&alias)?;
        let full_name = FullName::new(uri, name.text());

        let Some(LocalType::Enum(declared)) = ty else {
            return Ok(Value::UntypedEnum(UntypedEnumMember::new(full_name, member.text())));
        };
        let Some(enum_type) = self.universe()?.enum_type(&full_name) else {
            return Err(self.error(
                DiagnosticCode::InvalidEnumReference,
                format!("Invalid enum reference '{}'.", full_name),
                alias.span.to(&name.span),
            ));
        };
        if &full_name != declared {
            return Err(self.error(
                DiagnosticCode::EnumNotEqualToTheDeclared,
                format!(
                    "Enum '{}' is not equal to the declared enum '{}'.",
                    full_name, declared
                ),
                alias.span.to(&name.span),
            ));
        }
        match enum_type.member_value(member.text()) {
            Some(value) => Ok(Value::Enum(EnumValue::new(
                full_name,
                member.text(),
                value.clone(),
            ))),
            None => Err(self.error(
                DiagnosticCode::InvalidEnumMemberName,
                format!(
                    "Invalid enum member name '{}' of enum '{}'.",
                    member.text(),
                    full_name
                ),
                member.span,
            )),
        }
    }

    fn nested_class_value(&mut self, ty: Option<&LocalType>, span: TextSpan) -> Result<Value> {
        match ty {
            None => self.class_value(None),
            Some(LocalType::Class(name)) => {
                let class = self
                    .universe()?
                    .class(name)
                    .ok_or_else(|| Error::internal(format!("class {} is not in the metadata", name)))?;
                self.class_value(Some(class))
            }
            Some(other) => Err(self.type_mismatch(other, span)),
        }
    }

    /// Parses items until the lookahead no longer starts a value or a comma
    /// is missing, calling `add` with each item and its span.
    fn items<F>(&mut self, item_ty: Option<&LocalType>, mut add: F) -> Result<()>
    where
        F: FnMut(&mut Self, Value, TextSpan) -> Result<()>,
    {
        loop {
            let start = self.cursor.peek(0)?.span.clone();
            let Some(item) = self.local_value_opt(item_ty)? else {
                break;
            };
            let span = start.to(self.cursor.last_span());
            add(self, item, span)?;
            if self.cursor.token(',')?.is_none() {
                break;
            }
        }
        Ok(())
    }

    // ListOrSet := '[' (Local (',' Local)*)? ']'
    fn list_or_set(&mut self, ty: Option<&LocalType>) -> Result<Value> {
        let open = self.cursor.consume()?;
        let value = match ty {
            None => {
                let mut list = Vec::new();
                self.items(None, |_, item, _| {
                    list.push(item);
                    Ok(())
                })?;
                Value::List(list)
            }
            Some(LocalType::List(item_ty)) => {
                let mut list = Vec::new();
                self.items(Some(&**item_ty), |_, item, _| {
                    list.push(item);
                    Ok(())
                })?;
                Value::List(list)
            }
            Some(LocalType::SimpleSet(item_ty)) => {
                let mut set = IndexSet::new();
                self.items(Some(&**item_ty), |parser, item, span| {
                    let text = item.to_string();
                    if set.insert(item) {
                        Ok(())
                    } else {
                        Err(parser.duplicate_set_item(&text, span))
                    }
                })?;
                Value::Set(set)
            }
            Some(LocalType::ObjectSet {
                class,
                key_selector,
            }) => {
                let metadata = self.universe()?;
                let item_ty = LocalType::Class(class.clone());
                let mut set = IndexMap::new();
                self.items(Some(&item_ty), |parser, item, span| {
                    let Value::Object(object) = item else {
                        return Err(Error::internal("object set item is not an object"));
                    };
                    let key = metadata.extract_key(&object, key_selector).ok_or_else(|| {
                        Error::internal(format!(
                            "object set key '{}' not found on {}",
                            key_selector.join("."),
                            object.class()
                        ))
                    })?;
                    if set.contains_key(&key) {
                        return Err(parser.duplicate_set_item(&key.to_string(), span));
                    }
                    set.insert(key, object);
                    Ok(())
                })?;
                Value::ObjectSet(set)
            }
            Some(other) => return Err(self.type_mismatch(other, open.span)),
        };
        self.cursor.token_expected(']')?;
        Ok(value)
    }

    fn duplicate_set_item(&mut self, item: &str, span: TextSpan) -> Error {
        self.error(
            DiagnosticCode::DuplicateSetItem,
            format!("Duplicate set item '{}'.", item),
            span,
        )
    }

    // Map := '#[' (Local '=' Local (',' Local '=' Local)*)? ']'
    fn map(&mut self, ty: Option<&LocalType>) -> Result<Value> {
        let open = self.cursor.consume()?;
        let (key_ty, value_ty) = match ty {
            None => (None, None),
            Some(LocalType::Map { key, value }) => (Some(&**key), Some(&**value)),
            Some(other) => return Err(self.type_mismatch(other, open.span)),
        };
        let mut map = IndexMap::new();
        loop {
            let start = self.cursor.peek(0)?.span.clone();
            let Some(key) = self.local_value_opt(key_ty)? else {
                break;
            };
            if map.contains_key(&key) {
                let span = start.to(self.cursor.last_span());
                return Err(self.error(
                    DiagnosticCode::DuplicateMapKey,
                    format!("Duplicate map key '{}'.", key),
                    span,
                ));
            }
            self.cursor.token_expected('=')?;
            let value = self.local_value(value_ty)?;
            map.insert(key, value);
            if self.cursor.token(',')?.is_none() {
                break;
            }
        }
        self.cursor.token_expected(']')?;
        Ok(Value::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Severity;

    fn load_untyped(text: &str) -> (Result<Value>, LoadingContext) {
        let mut ctx = LoadingContext::new();
        let result = Loader::new(None).load(text, None, &mut ctx);
        (result, ctx)
    }

    fn first_code(text: &str) -> DiagnosticCode {
        let (result, ctx) = load_untyped(text);
        assert!(result.unwrap_err().is_aborted());
        ctx.diagnostics()[0].code
    }

    #[test]
    fn test_untyped_atoms_infer_kind() {
        let (value, _) = load_untyped(
            "{ i = -5, u = 18446744073709551615, d = 1.50, r = 2e3, s = \"x\", c = 'y', b = true }",
        );
        let value = value.unwrap();
        assert_eq!(value.get("i").and_then(Value::as_atom), Some(&Atom::Int64(-5)));
        assert_eq!(value.get("u").and_then(Value::as_atom), Some(&Atom::UInt64(u64::MAX)));
        assert_eq!(value.get("d").and_then(Value::as_atom).map(Atom::kind), Some(AtomKind::Decimal));
        assert_eq!(value.get("r").and_then(Value::as_f64), Some(2000.0));
        assert_eq!(value.get("s").and_then(Value::as_str), Some("x"));
        assert_eq!(value.get("c").and_then(Value::as_atom), Some(&Atom::Char('y')));
        assert_eq!(value.get("b").and_then(Value::as_bool), Some(true));
    }

    #[test]
    fn test_trailing_comma_allowed() {
        let (value, _) = load_untyped("{ a = [1, 2,], }");
        assert_eq!(value.unwrap().get("a").and_then(Value::len), Some(2));
    }

    #[test]
    fn test_untyped_enum_reference() {
        let (value, _) = load_untyped("<e = @\"urn:e\"> { c = e::Color.Red }");
        let value = value.unwrap();
        assert_eq!(
            value.get("c"),
            Some(&Value::UntypedEnum(UntypedEnumMember::new(
                FullName::new("urn:e", "Color"),
                "Red"
            )))
        );
    }

    #[test]
    fn test_unresolved_alias() {
        assert_eq!(first_code("{ c = e::Color.Red }"), DiagnosticCode::InvalidUriReference);
        assert_eq!(first_code("(x::T) { }"), DiagnosticCode::InvalidUriReference);
    }

    #[test]
    fn test_duplicate_alias_in_one_scope() {
        assert_eq!(first_code("<a = \"u1\", a = \"u2\"> { }"), DiagnosticCode::DuplicateAlias);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(first_code("{ a = }"), DiagnosticCode::ValueExpected);
        assert_eq!(first_code("{ a 1 }"), DiagnosticCode::TokenExpected);
        assert_eq!(first_code("{ } extra"), DiagnosticCode::TokenExpected);
        assert_eq!(first_code("[1]"), DiagnosticCode::TokenExpected);
        assert_eq!(first_code("{ a = #[1 = ] }"), DiagnosticCode::ValueExpected);
    }

    #[test]
    fn test_huge_integer_is_invalid_untyped() {
        assert_eq!(first_code("{ a = 99999999999999999999 }"), DiagnosticCode::InvalidAtomValue);
    }

    #[test]
    fn test_loader_is_reusable() {
        let mut loader = Loader::new(None);
        let mut ctx = LoadingContext::new();
        assert!(loader.load("<a = \"u\"> { x = (a::T) { } }", None, &mut ctx).is_ok());
        // the alias from the previous document must not leak
        assert!(loader.load("{ x = (a::T) { } }", None, &mut ctx).is_err());
        assert_eq!(ctx.diagnostics()[0].code, DiagnosticCode::InvalidUriReference);
    }

    #[test]
    fn test_typed_load_requires_root_class() {
        let metadata = Metadata::builder()
            .class(ClassMetadata::new(FullName::new("urn:t", "A")))
            .build()
            .unwrap();
        let mut ctx = LoadingContext::new();
        let err = Loader::new(Some(&metadata)).load("{ }", None, &mut ctx).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata(_)));
        let err = Loader::new(Some(&metadata))
            .load("{ }", Some(&FullName::new("urn:t", "Nope")), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata(_)));
    }

    #[test]
    fn test_file_path_in_spans() {
        let mut ctx = LoadingContext::new();
        let result = Loader::new(None)
            .with_options(LoadOptions::new().with_file_path("a.sdata"))
            .load("{ a = }", None, &mut ctx);
        assert!(result.is_err());
        assert_eq!(ctx.diagnostics()[0].span.file_path.as_deref(), Some("a.sdata"));
        assert!(ctx.diagnostics()[0].to_string().starts_with("a.sdata(1,7)"));
    }

    fn hooked(class: ClassMetadata) -> (Metadata, FullName) {
        let name = class.full_name().clone();
        let metadata = Metadata::builder().class(class).build().unwrap();
        (metadata, name)
    }

    #[test]
    fn test_silent_hook_failure_with_earlier_errors() {
        let (metadata, name) = hooked(
            ClassMetadata::new(FullName::new("urn:h", "H"))
                .property("n", LocalType::Atom(AtomKind::Int32))
                .on_loaded(|object, _| object.get("n").and_then(Value::as_i64) != Some(0)),
        );
        let mut loader = Loader::new(Some(&metadata));
        let mut ctx = LoadingContext::new();
        assert!(loader.load("{ n = }", Some(&name), &mut ctx).unwrap_err().is_aborted());
        assert!(ctx.has_errors());

        // the context still holds the earlier error
        let err = loader.load("{ n = 0 }", Some(&name), &mut ctx).unwrap_err();
        assert!(matches!(err, Error::Internal(_)), "got {:?}", err);
        assert_eq!(ctx.errors().count(), 1);
    }

    #[test]
    fn test_hook_error_aborts() {
        let (metadata, name) = hooked(ClassMetadata::new(FullName::new("urn:h", "H")).on_loading(
            |_, ctx| {
                ctx.add_error(DiagnosticCode::InvalidPropertyName, "rejected", TextSpan::default());
                false
            },
        ));
        let mut ctx = LoadingContext::new();
        let err = Loader::new(Some(&metadata)).load("{ }", Some(&name), &mut ctx).unwrap_err();
        assert!(err.is_aborted());
        assert_eq!(ctx.diagnostics()[0].message, "rejected");
    }

    #[test]
    fn test_hook_warning_keeps_loading() {
        let (metadata, name) = hooked(ClassMetadata::new(FullName::new("urn:h", "H")).on_loaded(
            |_, ctx| {
                ctx.add_warning(DiagnosticCode::InvalidPropertyName, "deprecated", TextSpan::default());
                true
            },
        ));
        let mut ctx = LoadingContext::new();
        assert!(Loader::new(Some(&metadata)).load("{ }", Some(&name), &mut ctx).is_ok());
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].severity, Severity::Warning);
        assert!(!ctx.has_errors());
    }
}
