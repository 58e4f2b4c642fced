//! In-memory object graphs produced by the loader and consumed by the saver.
//!
//! ## Core Types
//!
//! - [`Value`]: any local value (null, atom, class value, enum member, collection)
//! - [`Object`]: an instance of a metadata class
//! - [`UntypedObject`]: a class value read without metadata
//! - [`EnumValue`] / [`UntypedEnumMember`]: enum member references
//!
//! ## Equality
//!
//! Lists compare element by element in order. Sets, object sets, maps and the
//! properties of an object compare without regard to order. That is the
//! structural equality under which `load(save(g)) == g` holds.
//!
//! ## Examples
//!
//! ```rust
//! use sdata::{UntypedObject, Value};
//!
//! let point = UntypedObject::new()
//!     .with("x", Value::from(10))
//!     .with("y", Value::from(20));
//! let value = Value::from(point);
//!
//! assert!(value.is_object());
//! assert_eq!(value.get("x").and_then(Value::as_i64), Some(10));
//! ```

use crate::atom::Atom;
use crate::map::PropertyMap;
use crate::metadata::FullName;
use indexmap::{IndexMap, IndexSet};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A local value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Atom(Atom),
    Object(Object),
    UntypedObject(UntypedObject),
    Enum(EnumValue),
    UntypedEnum(UntypedEnumMember),
    /// Ordered, duplicates allowed.
    List(Vec<Value>),
    /// Simple set of atoms or enum members.
    Set(IndexSet<Value>),
    /// Class values keyed by their key-selector value.
    ObjectSet(IndexMap<Value, Object>),
    Map(IndexMap<Value, Value>),
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Atom(atom) => atom.hash(state),
            Value::Enum(member) => member.hash(state),
            Value::UntypedEnum(member) => member.hash(state),
            Value::Object(object) => {
                object.class.hash(state);
                object.properties.len().hash(state);
            }
            Value::UntypedObject(object) => {
                object.type_indicator.hash(state);
                object.properties.len().hash(state);
            }
            Value::List(items) => items.hash(state),
            // unordered: only the size is order-independent
            Value::Set(items) => items.len().hash(state),
            Value::ObjectSet(items) => items.len().hash(state),
            Value::Map(entries) => entries.len().hash(state),
        }
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        matches!(self, Value::Atom(_))
    }

    /// Typed or untyped class value.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_) | Value::UntypedObject(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, Value::Enum(_) | Value::UntypedEnum(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Set(_) | Value::ObjectSet(_) | Value::Map(_)
        )
    }

    #[must_use]
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// String or case-insensitive string contents.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_atom().and_then(Atom::as_str)
    }

    /// Any integer atom whose value fits in `i64`.
    ///
    /// ```rust
    /// use sdata::{Atom, Value};
    ///
    /// assert_eq!(Value::Atom(Atom::Byte(7)).as_i64(), Some(7));
    /// assert_eq!(Value::Atom(Atom::UInt64(u64::MAX)).as_i64(), None);
    /// assert_eq!(Value::from("7").as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_atom()
            .and_then(Atom::as_i128)
            .and_then(|v| i64::try_from(v).ok())
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Atom(Atom::Double(v)) => Some(*v),
            Value::Atom(Atom::Single(v)) => Some(f64::from(*v)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Atom(Atom::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_untyped_object(&self) -> Option<&UntypedObject> {
        match self {
            Value::UntypedObject(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(member) => Some(member),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&IndexSet<Value>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object_set(&self) -> Option<&IndexMap<Value, Object>> {
        match self {
            Value::ObjectSet(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Property lookup on a typed or untyped class value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(name),
            Value::UntypedObject(object) => object.properties.get(name),
            _ => None,
        }
    }

    /// Number of items for collections, properties for class values.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Set(items) => Some(items.len()),
            Value::ObjectSet(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            Value::Object(object) => Some(object.properties.len()),
            Value::UntypedObject(object) => Some(object.properties.len()),
            _ => None,
        }
    }
}

/// An instance of a metadata class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    class: FullName,
    /// Declared properties, inherited ones included.
    pub properties: PropertyMap,
    /// Properties the class does not declare, kept when its root class
    /// collects them.
    pub unknown_properties: PropertyMap,
}

impl Object {
    #[must_use]
    pub fn new(class: FullName) -> Self {
        Object {
            class,
            properties: PropertyMap::new(),
            unknown_properties: PropertyMap::new(),
        }
    }

    #[must_use]
    pub fn class(&self) -> &FullName {
        &self.class
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }
}

/// A class value read without metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UntypedObject {
    pub type_indicator: Option<FullName>,
    pub properties: PropertyMap,
}

impl UntypedObject {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, type_indicator: FullName) -> Self {
        self.type_indicator = Some(type_indicator);
        self
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// A member of a metadata enum.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub enum_name: FullName,
    pub member: String,
    pub value: Atom,
}

impl EnumValue {
    #[must_use]
    pub fn new(enum_name: FullName, member: impl Into<String>, value: Atom) -> Self {
        EnumValue {
            enum_name,
            member: member.into(),
            value,
        }
    }
}

/// An enum member reference read without metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UntypedEnumMember {
    pub type_name: FullName,
    pub member_name: String,
}

impl UntypedEnumMember {
    #[must_use]
    pub fn new(type_name: FullName, member_name: impl Into<String>) -> Self {
        UntypedEnumMember {
            type_name,
            member_name: member_name.into(),
        }
    }
}

impl From<Atom> for Value {
    fn from(atom: Atom) -> Self {
        Value::Atom(atom)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Atom(Atom::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Atom(Atom::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Atom(Atom::Boolean(value))
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Atom(Atom::Char(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Atom(Atom::Int32(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Atom(Atom::Int64(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Atom(Atom::UInt64(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Atom(Atom::Double(value))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<UntypedObject> for Value {
    fn from(object: UntypedObject) -> Self {
        Value::UntypedObject(object)
    }
}

impl From<EnumValue> for Value {
    fn from(member: EnumValue) -> Self {
        Value::Enum(member)
    }
}

impl From<UntypedEnumMember> for Value {
    fn from(member: UntypedEnumMember) -> Self {
        Value::UntypedEnum(member)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A short single-line rendering, used in messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Atom(atom) => {
                let mut literal = String::new();
                atom.write_literal(&mut literal);
                f.write_str(&literal)
            }
            Value::Object(object) => write!(f, "{} {{..}}", object.class),
            Value::UntypedObject(object) => match &object.type_indicator {
                Some(name) => write!(f, "{} {{..}}", name),
                None => write!(f, "{{..}}"),
            },
            Value::Enum(member) => write!(f, "{}.{}", member.enum_name, member.member),
            Value::UntypedEnum(member) => write!(f, "{}.{}", member.type_name, member.member_name),
            Value::List(items) => write!(f, "[{} items]", items.len()),
            Value::Set(items) => write!(f, "[{} items]", items.len()),
            Value::ObjectSet(items) => write!(f, "[{} items]", items.len()),
            Value::Map(entries) => write!(f, "#[{} entries]", entries.len()),
        }
    }
}

struct AtomRepr<'a>(&'a Atom);

impl Serialize for AtomRepr<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Atom::String(s) | Atom::IgnoreCaseString(s) => serializer.serialize_str(s),
            Atom::Char(ch) => serializer.serialize_char(*ch),
            Atom::Int64(v) => serializer.serialize_i64(*v),
            Atom::Int32(v) => serializer.serialize_i32(*v),
            Atom::Int16(v) => serializer.serialize_i16(*v),
            Atom::SByte(v) => serializer.serialize_i8(*v),
            Atom::UInt64(v) => serializer.serialize_u64(*v),
            Atom::UInt32(v) => serializer.serialize_u32(*v),
            Atom::UInt16(v) => serializer.serialize_u16(*v),
            Atom::Byte(v) => serializer.serialize_u8(*v),
            Atom::Double(v) => serializer.serialize_f64(*v),
            Atom::Single(v) => serializer.serialize_f32(*v),
            Atom::Boolean(b) => serializer.serialize_bool(*b),
            // exact text for kinds without a lossless serde primitive
            Atom::Decimal(_)
            | Atom::Binary(_)
            | Atom::Guid(_)
            | Atom::TimeSpan(_)
            | Atom::DateTimeOffset(_) => serializer.serialize_str(&self.0.format()),
        }
    }
}

fn serialize_properties<S>(serializer: S, groups: &[&PropertyMap]) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let len = groups.iter().map(|g| g.len()).sum();
    let mut map = serializer.serialize_map(Some(len))?;
    for group in groups {
        for (k, v) in group.iter() {
            map.serialize_entry(k, v)?;
        }
    }
    map.end()
}

/// Bridges a graph into any serde format. Class values become maps, enum
/// members their member name, collections sequences; map literals become a
/// sequence of `[key, value]` pairs since keys need not be strings.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Atom(atom) => AtomRepr(atom).serialize(serializer),
            Value::Object(object) => {
                serialize_properties(serializer, &[&object.properties, &object.unknown_properties])
            }
            Value::UntypedObject(object) => serialize_properties(serializer, &[&object.properties]),
            Value::Enum(member) => serializer.serialize_str(&member.member),
            Value::UntypedEnum(member) => serializer.serialize_str(&member.member_name),
            Value::List(items) => serializer.collect_seq(items),
            Value::Set(items) => serializer.collect_seq(items),
            Value::ObjectSet(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for object in items.values() {
                    seq.serialize_element(&Value::Object(object.clone()))?;
                }
                seq.end()
            }
            Value::Map(entries) => serializer.collect_seq(entries.iter()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_list_order_matters() {
        let a = Value::from(vec![Value::from(1), Value::from(2)]);
        let b = Value::from(vec![Value::from(2), Value::from(1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_set_and_map_order_does_not_matter() {
        let a = Value::Set([Value::from(1), Value::from(2)].into_iter().collect());
        let b = Value::Set([Value::from(2), Value::from(1)].into_iter().collect());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let m1 = Value::Map([(Value::from(1), Value::from("a")), (Value::from(2), Value::from("b"))]
            .into_iter()
            .collect());
        let m2 = Value::Map([(Value::from(2), Value::from("b")), (Value::from(1), Value::from("a"))]
            .into_iter()
            .collect());
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_object_accessors() {
        let class = FullName::new("urn:t", "P");
        let value = Value::from(Object::new(class.clone()).with("x", 5).with("tag", "t"));
        assert_eq!(value.get("x").and_then(Value::as_i64), Some(5));
        assert_eq!(value.get("tag").and_then(Value::as_str), Some("t"));
        assert_eq!(value.as_object().map(Object::class), Some(&class));
        assert_eq!(value.len(), Some(2));
    }

    #[test]
    fn test_option_into_value() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(true)).as_bool(), Some(true));
    }

    #[test]
    fn test_serialize_to_json() {
        let value = Value::from(
            UntypedObject::new()
                .with("name", "Ann")
                .with("tags", Value::from(vec![Value::from(1), Value::Null])),
        );
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"name":"Ann","tags":[1,null]}"#);
    }

    #[test]
    fn test_display_is_single_line() {
        assert_eq!(Value::from("a\"b").to_string(), "@\"a\"\"b\"");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
