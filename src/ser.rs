//! Document saving.
//!
//! This module provides [`Saver`], which walks a [`Value`] graph and emits
//! canonical document text, the inverse of [`Loader`](crate::Loader).
//!
//! ## Overview
//!
//! - **Declared order**: typed class values list their properties in the
//!   order the metadata declares them, base class first, then any unknown
//!   properties
//! - **Aliases**: each namespace URI gets a short alias (`a0`, `a1`, ...) the
//!   first time it is referenced; the `<...>` alias header is inserted in
//!   front of the value once the whole value has been written
//! - **Type indicators**: written for the root and wherever the runtime class
//!   differs from the declared one
//! - **Deferred indentation**: indentation is only emitted when something is
//!   written at the start of a line, so multi-line verbatim strings are copied
//!   unchanged
//!
//! ## Usage
//!
//! ```rust
//! use sdata::{to_string_untyped, UntypedObject, Value};
//!
//! let value = Value::from(UntypedObject::new().with("a", 1).with("b", vec![Value::from(true)]));
//! let text = to_string_untyped(&value).unwrap();
//! assert_eq!(text, "{\n    a = 1,\n    b = [\n        true\n    ]\n}");
//! ```

use crate::atom::write_verbatim_string;
use crate::lexer::{is_identifier_part, is_identifier_start};
use crate::metadata::{FullName, LocalType, Metadata};
use crate::options::SaveOptions;
use crate::value::{Object, Value};
use crate::{Error, PropertyMap, Result};
use indexmap::IndexMap;
use tracing::{debug, trace};

const KEYWORDS: [&str; 3] = ["null", "true", "false"];

/// Writes value graphs, optionally against a metadata universe.
#[derive(Debug, Clone)]
pub struct Saver<'m> {
    metadata: Option<&'m Metadata>,
    options: SaveOptions,
}

impl<'m> Saver<'m> {
    /// A saver for typed graphs when `metadata` is given, untyped graphs
    /// otherwise.
    #[must_use]
    pub fn new(metadata: Option<&'m Metadata>) -> Self {
        Saver {
            metadata,
            options: SaveOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SaveOptions) -> Self {
        self.options = options;
        self
    }

    /// Writes `value`, which must be a class value, as a complete document.
    ///
    /// With metadata the root must be a [`Value::Object`] and every value is
    /// checked against its declared type; a mismatch is
    /// [`Error::InvalidValue`].
    pub fn save(&self, value: &Value) -> Result<String> {
        let mut out = String::with_capacity(256);
        self.save_to(value, &mut out)?;
        Ok(out)
    }

    /// Appends the document for `value` to `out`.
    #[tracing::instrument(level = "debug", skip_all, fields(typed = self.metadata.is_some()))]
    pub fn save_to(&self, value: &Value, out: &mut String) -> Result<()> {
        let start = out.len();
        let mut writer = DocumentWriter {
            text: IndentedWriter::new(std::mem::take(out), &self.options),
            metadata: self.metadata,
            aliases: IndexMap::new(),
        };
        let result = writer.root(value);
        let DocumentWriter { text, aliases, .. } = writer;
        *out = text.into_inner();
        if let Err(err) = result {
            out.truncate(start);
            debug!(error = %err, "document failed to save");
            return Err(err);
        }

        if !aliases.is_empty() {
            let mut header = String::from("<");
            for (i, (uri, alias)) in aliases.iter().enumerate() {
                if i > 0 {
                    header.push_str(", ");
                }
                header.push_str(alias);
                header.push_str(" = ");
                write_verbatim_string(&mut header, uri);
            }
            header.push('>');
            header.push(if self.options.pretty { '\n' } else { ' ' });
            out.insert_str(start, &header);
        }
        debug!(aliases = aliases.len(), bytes = out.len() - start, "document saved");
        Ok(())
    }
}

/// Text buffer that materializes indentation lazily at line starts.
struct IndentedWriter {
    buf: String,
    unit: usize,
    pretty: bool,
    level: usize,
    at_line_start: bool,
}

impl IndentedWriter {
    fn new(buf: String, options: &SaveOptions) -> Self {
        let at_line_start = buf.is_empty() || buf.ends_with('\n');
        IndentedWriter {
            buf,
            unit: options.indent,
            pretty: options.pretty,
            level: 0,
            at_line_start,
        }
    }

    fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.at_line_start {
            let width = self.level * self.unit;
            self.buf.extend(std::iter::repeat(' ').take(width));
            self.at_line_start = false;
        }
        self.buf.push_str(s);
    }

    fn new_line(&mut self) {
        self.buf.push('\n');
        self.at_line_start = true;
    }

    fn push_indent(&mut self) {
        self.level += 1;
    }

    fn pop_indent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    fn into_inner(self) -> String {
        self.buf
    }
}

struct DocumentWriter<'m> {
    text: IndentedWriter,
    metadata: Option<&'m Metadata>,
    /// uri -> alias, in allocation order
    aliases: IndexMap<String, String>,
}

impl<'m> DocumentWriter<'m> {
    fn root(&mut self, value: &Value) -> Result<()> {
        match (self.metadata, value) {
            (Some(_), Value::Object(object)) => self.typed_object(object, None),
            (Some(_), other) => Err(Error::invalid_value(format!(
                "the root of a typed document must be a typed class value, found {}",
                other
            ))),
            (None, Value::Object(object)) => self.untyped_object(object),
            (None, Value::UntypedObject(_)) => self.untyped_local(value),
            (None, other) => Err(Error::invalid_value(format!(
                "the root of a document must be a class value, found {}",
                other
            ))),
        }
    }

    fn alias_for(&mut self, uri: &str) -> String {
        if let Some(alias) = self.aliases.get(uri) {
            return alias.clone();
        }
        let alias = format!("a{}", self.aliases.len());
        trace!(%alias, uri, "allocate alias");
        self.aliases.insert(uri.to_string(), alias.clone());
        alias
    }

    fn qualified_name(&mut self, name: &FullName) -> Result<()> {
        let alias = self.alias_for(&name.uri);
        self.text.write(&alias);
        self.text.write("::");
        self.identifier(&name.name)
    }

    fn identifier(&mut self, name: &str) -> Result<()> {
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_part);
        if !valid {
            return Err(Error::invalid_value(format!("'{}' is not a valid identifier", name)));
        }
        if KEYWORDS.contains(&name) {
            self.text.write("@");
        }
        self.text.write(name);
        Ok(())
    }

    fn type_indicator(&mut self, name: &FullName) -> Result<()> {
        self.text.write("(");
        self.qualified_name(name)?;
        self.text.write(") ");
        Ok(())
    }

    /// Writes `open item, item close`, one item per line when pretty. `pad`
    /// puts a space inside the delimiters in compact mode.
    fn sequence<I, T, F>(&mut self, open: &str, close: &str, pad: bool, items: I, mut write_item: F) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T) -> Result<()>,
    {
        let mut items = items.into_iter().peekable();
        self.text.write(open);
        if items.peek().is_none() {
            self.text.write(close);
            return Ok(());
        }
        if self.text.pretty {
            self.text.new_line();
            self.text.push_indent();
        } else if pad {
            self.text.write(" ");
        }
        let mut first = true;
        for item in items {
            if !first {
                self.text.write(",");
                if self.text.pretty {
                    self.text.new_line();
                } else {
                    self.text.write(" ");
                }
            }
            first = false;
            write_item(self, item)?;
        }
        if self.text.pretty {
            self.text.new_line();
            self.text.pop_indent();
        } else if pad {
            self.text.write(" ");
        }
        self.text.write(close);
        Ok(())
    }

    fn property(&mut self, name: &str) -> Result<()> {
        self.identifier(name)?;
        self.text.write(" = ");
        Ok(())
    }

    fn universe(&self) -> Result<&'m Metadata> {
        self.metadata
            .ok_or_else(|| Error::internal("typed value written without metadata"))
    }

    fn typed_object(&mut self, object: &Object, declared: Option<&FullName>) -> Result<()> {
        let metadata = self.universe()?;
        let class = metadata
            .class(object.class())
            .ok_or_else(|| Error::invalid_value(format!("class {} is not in the metadata", object.class())))?;
        if let Some(declared) = declared {
            if !metadata.is_equal_or_derive(object.class(), declared) {
                return Err(Error::invalid_value(format!(
                    "class {} is not equal to or derived from {}",
                    object.class(),
                    declared
                )));
            }
        }
        if class.is_abstract() {
            return Err(Error::invalid_value(format!(
                "cannot save an instance of abstract class {}",
                object.class()
            )));
        }
        if let Some(name) = object
            .properties
            .keys()
            .find(|name| metadata.find_property(object.class(), name).is_none())
        {
            return Err(Error::invalid_value(format!(
                "property '{}' is not declared by {}",
                name,
                object.class()
            )));
        }
        if !object.unknown_properties.is_empty() && !metadata.allows_unknown_properties(object.class()) {
            return Err(Error::invalid_value(format!(
                "{} does not collect unknown properties",
                object.class()
            )));
        }

        if declared != Some(object.class()) {
            self.type_indicator(object.class())?;
        }

        let null = Value::Null;
        let properties = metadata.all_properties(object.class());
        let mut entries = Vec::with_capacity(properties.len() + object.unknown_properties.len());
        for property in properties {
            match object.properties.get(property.name()) {
                Some(value) => entries.push((property.name(), value, Some(property.ty()))),
                None if property.ty().is_nullable() => {
                    entries.push((property.name(), &null, Some(property.ty())))
                }
                None => {
                    return Err(Error::invalid_value(format!(
                        "property '{}' of {} is missing",
                        property.name(),
                        object.class()
                    )))
                }
            }
        }
        entries.extend(
            object
                .unknown_properties
                .iter()
                .map(|(name, value)| (name.as_str(), value, None)),
        );

        self.sequence("{", "}", true, entries, |w, (name, value, ty)| {
            w.property(name)?;
            match ty {
                Some(ty) => w.typed_local(value, ty),
                None => w.untyped_local(value),
            }
        })
    }

    fn typed_local(&mut self, value: &Value, ty: &LocalType) -> Result<()> {
        if value.is_null() {
            if ty.is_nullable() {
                self.text.write("null");
                return Ok(());
            }
            return Err(Error::invalid_value(format!("null is not allowed for {}", ty)));
        }
        match (ty.non_nullable(), value) {
            (LocalType::Atom(kind), Value::Atom(atom)) if atom.kind() == *kind => {
                atom.validate()?;
                let mut literal = String::new();
                atom.write_literal(&mut literal);
                self.text.write(&literal);
                Ok(())
            }
            (LocalType::Enum(name), Value::Enum(member)) if &member.enum_name == name => {
                let known = self
                    .universe()?
                    .enum_type(name)
                    .and_then(|e| e.member_value(&member.member))
                    .is_some();
                if !known {
                    return Err(Error::invalid_value(format!(
                        "'{}' is not a member of enum {}",
                        member.member, name
                    )));
                }
                self.enum_member(name, &member.member)
            }
            (LocalType::Class(name), Value::Object(object)) => self.typed_object(object, Some(name)),
            (LocalType::List(item_ty), Value::List(items)) => {
                self.sequence("[", "]", false, items, |w, item| w.typed_local(item, item_ty))
            }
            (LocalType::SimpleSet(item_ty), Value::Set(items)) => {
                self.sequence("[", "]", false, items, |w, item| w.typed_local(item, item_ty))
            }
            (LocalType::ObjectSet { class, .. }, Value::ObjectSet(items)) => {
                self.sequence("[", "]", false, items.values(), |w, object| {
                    w.typed_object(object, Some(class))
                })
            }
            (LocalType::Map { key, value: value_ty }, Value::Map(entries)) => {
                self.sequence("#[", "]", false, entries, |w, (k, v)| {
                    w.typed_local(k, key)?;
                    w.text.write(" = ");
                    w.typed_local(v, value_ty)
                })
            }
            (expected, found) => Err(Error::invalid_value(format!(
                "expected a value of type {}, found {}",
                expected, found
            ))),
        }
    }

    fn enum_member(&mut self, name: &FullName, member: &str) -> Result<()> {
        self.qualified_name(name)?;
        self.text.write(".");
        self.identifier(member)
    }

    fn untyped_object(&mut self, object: &Object) -> Result<()> {
        self.type_indicator(object.class())?;
        let entries = object.properties.iter().chain(object.unknown_properties.iter());
        self.untyped_properties(entries)
    }

    fn untyped_properties<'v, I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'v String, &'v Value)>,
    {
        self.sequence("{", "}", true, entries, |w, (name, value)| {
            w.property(name)?;
            w.untyped_local(value)
        })
    }

    fn untyped_local(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => {
                self.text.write("null");
                Ok(())
            }
            Value::Atom(atom) => {
                atom.validate()?;
                let mut literal = String::new();
                atom.write_literal(&mut literal);
                self.text.write(&literal);
                Ok(())
            }
            Value::Object(object) => self.untyped_object(object),
            Value::UntypedObject(object) => {
                if let Some(name) = &object.type_indicator {
                    self.type_indicator(name)?;
                }
                let properties: &PropertyMap = &object.properties;
                self.untyped_properties(properties)
            }
            Value::Enum(member) => self.enum_member(&member.enum_name, &member.member),
            Value::UntypedEnum(member) => self.enum_member(&member.type_name, &member.member_name),
            Value::List(items) => self.sequence("[", "]", false, items, Self::untyped_local),
            Value::Set(items) => self.sequence("[", "]", false, items, Self::untyped_local),
            Value::ObjectSet(items) => {
                self.sequence("[", "]", false, items.values(), Self::untyped_object)
            }
            Value::Map(entries) => self.sequence("#[", "]", false, entries, |w, (k, v)| {
                w.untyped_local(k)?;
                w.text.write(" = ");
                w.untyped_local(v)
            }),
        }
    }
}
