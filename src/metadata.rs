//! Read-only type descriptors that direct loading and saving.
//!
//! A [`Metadata`] universe holds every class and enum a document may mention,
//! keyed by [`FullName`]. It is assembled once through a [`MetadataBuilder`],
//! which checks that the descriptor tree is consistent, and is then shared
//! immutably by any number of sessions.
//!
//! ## Examples
//!
//! ```rust
//! use sdata::{AtomKind, ClassMetadata, FullName, LocalType, Metadata};
//!
//! let person = FullName::new("urn:demo", "Person");
//! let metadata = Metadata::builder()
//!     .class(
//!         ClassMetadata::new(person.clone())
//!             .property("name", LocalType::Atom(AtomKind::String))
//!             .property("nickname", LocalType::nullable(LocalType::Atom(AtomKind::String))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let class = metadata.class(&person).unwrap();
//! assert_eq!(class.properties().count(), 2);
//! ```

use crate::atom::{Atom, AtomKind};
use crate::diag::LoadingContext;
use crate::value::{Object, Value};
use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;

/// A namespace URI plus a local name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullName {
    pub uri: String,
    pub name: String,
}

impl FullName {
    #[must_use]
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        FullName {
            uri: uri.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.uri, self.name)
    }
}

/// The declared type of a property, collection item or map key/value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalType {
    Nullable(Box<LocalType>),
    Atom(AtomKind),
    Enum(FullName),
    Class(FullName),
    List(Box<LocalType>),
    SimpleSet(Box<LocalType>),
    /// A set of class values identified by the property path `key_selector`.
    ObjectSet {
        class: FullName,
        key_selector: Vec<String>,
    },
    Map {
        key: Box<LocalType>,
        value: Box<LocalType>,
    },
}

impl LocalType {
    #[must_use]
    pub fn nullable(inner: LocalType) -> Self {
        LocalType::Nullable(Box::new(inner))
    }

    #[must_use]
    pub fn list(item: LocalType) -> Self {
        LocalType::List(Box::new(item))
    }

    #[must_use]
    pub fn simple_set(item: LocalType) -> Self {
        LocalType::SimpleSet(Box::new(item))
    }

    #[must_use]
    pub fn object_set<I, S>(class: FullName, key_selector: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LocalType::ObjectSet {
            class,
            key_selector: key_selector.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn map(key: LocalType, value: LocalType) -> Self {
        LocalType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, LocalType::Nullable(_))
    }

    /// The type with any nullable wrapper removed.
    #[must_use]
    pub fn non_nullable(&self) -> &LocalType {
        match self {
            LocalType::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Atom or enum: the types allowed as set items and map keys.
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        matches!(self, LocalType::Atom(_) | LocalType::Enum(_))
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            LocalType::Nullable(_) => "nullable",
            LocalType::Atom(_) => "atom",
            LocalType::Enum(_) => "enum",
            LocalType::Class(_) => "class",
            LocalType::List(_) => "list",
            LocalType::SimpleSet(_) => "simple set",
            LocalType::ObjectSet { .. } => "object set",
            LocalType::Map { .. } => "map",
        }
    }
}

impl fmt::Display for LocalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalType::Nullable(inner) => write!(f, "{}?", inner),
            LocalType::Atom(kind) => write!(f, "{}", kind),
            LocalType::Enum(name) | LocalType::Class(name) => write!(f, "{}", name),
            LocalType::List(item) => write!(f, "List<{}>", item),
            LocalType::SimpleSet(item) => write!(f, "SimpleSet<{}>", item),
            LocalType::ObjectSet {
                class,
                key_selector,
            } => write!(f, "ObjectSet<{}\\{}>", class, key_selector.join(".")),
            LocalType::Map { key, value } => write!(f, "Map<{}, {}>", key, value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyMetadata {
    name: String,
    ty: LocalType,
}

impl PropertyMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: LocalType) -> Self {
        PropertyMetadata {
            name: name.into(),
            ty,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &LocalType {
        &self.ty
    }

    pub fn set_value(&self, object: &mut Object, value: Value) {
        object.properties.insert(self.name.clone(), value);
    }
}

/// Called before a class value's properties are read (`on_loading`) or after
/// they have been read and checked (`on_loaded`). Returning `false` aborts the
/// session; the hook is expected to have recorded a diagnostic first.
pub type LoadHook = Arc<dyn Fn(&mut Object, &mut LoadingContext) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ClassMetadata {
    full_name: FullName,
    is_abstract: bool,
    base: Option<FullName>,
    properties: IndexMap<String, PropertyMetadata>,
    redeclared: Vec<String>,
    unknown_properties: bool,
    on_loading: Option<LoadHook>,
    on_loaded: Option<LoadHook>,
}

impl ClassMetadata {
    #[must_use]
    pub fn new(full_name: FullName) -> Self {
        ClassMetadata {
            full_name,
            is_abstract: false,
            base: None,
            properties: IndexMap::new(),
            redeclared: Vec::new(),
            unknown_properties: false,
            on_loading: None,
            on_loaded: None,
        }
    }

    #[must_use]
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn base(mut self, base: FullName) -> Self {
        self.base = Some(base);
        self
    }

    /// Declares a property. Declaring the same name twice is reported by
    /// [`MetadataBuilder::build`].
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, ty: LocalType) -> Self {
        let name = name.into();
        if self.properties.contains_key(&name) {
            self.redeclared.push(name);
            return self;
        }
        self.properties
            .insert(name.clone(), PropertyMetadata::new(name, ty));
        self
    }

    /// Collects properties the class does not declare into
    /// [`Object::unknown_properties`] instead of rejecting them. Only valid on
    /// a root class; derived classes share their root's setting.
    #[must_use]
    pub fn unknown_properties(mut self) -> Self {
        self.unknown_properties = true;
        self
    }

    #[must_use]
    pub fn on_loading<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Object, &mut LoadingContext) -> bool + Send + Sync + 'static,
    {
        self.on_loading = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_loaded<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Object, &mut LoadingContext) -> bool + Send + Sync + 'static,
    {
        self.on_loaded = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[must_use]
    pub fn base_class(&self) -> Option<&FullName> {
        self.base.as_ref()
    }

    /// Properties declared on this class itself, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyMetadata> {
        self.properties.values()
    }

    #[must_use]
    pub fn property_metadata(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.get(name)
    }

    #[must_use]
    pub const fn allows_unknown_properties(&self) -> bool {
        self.unknown_properties
    }

    #[must_use]
    pub fn create_instance(&self) -> Object {
        Object::new(self.full_name.clone())
    }

    pub(crate) fn invoke_on_loading(&self, object: &mut Object, ctx: &mut LoadingContext) -> bool {
        self.on_loading.as_ref().map_or(true, |hook| hook(object, ctx))
    }

    pub(crate) fn invoke_on_loaded(&self, object: &mut Object, ctx: &mut LoadingContext) -> bool {
        self.on_loaded.as_ref().map_or(true, |hook| hook(object, ctx))
    }

}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("full_name", &self.full_name)
            .field("is_abstract", &self.is_abstract)
            .field("base", &self.base)
            .field("properties", &self.properties)
            .field("unknown_properties", &self.unknown_properties)
            .field("on_loading", &self.on_loading.as_ref().map(|_| "<hook>"))
            .field("on_loaded", &self.on_loaded.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMetadata {
    full_name: FullName,
    underlying: AtomKind,
    members: IndexMap<String, Atom>,
}

impl EnumMetadata {
    #[must_use]
    pub fn new(full_name: FullName, underlying: AtomKind) -> Self {
        EnumMetadata {
            full_name,
            underlying,
            members: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Atom>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    #[must_use]
    pub const fn underlying(&self) -> AtomKind {
        self.underlying
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Atom)> {
        self.members.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn member_value(&self, name: &str) -> Option<&Atom> {
        self.members.get(name)
    }

    /// The first member whose value equals `value`.
    #[must_use]
    pub fn member_by_value(&self, value: &Atom) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, member)| *member == value)
            .map(|(name, _)| name.as_str())
    }
}

/// The universe of classes and enums a session can resolve.
#[derive(Clone, Debug, Default)]
pub struct Metadata {
    classes: IndexMap<FullName, ClassMetadata>,
    enums: IndexMap<FullName, EnumMetadata>,
}

impl Metadata {
    #[must_use]
    pub fn builder() -> MetadataBuilder {
        MetadataBuilder::default()
    }

    #[must_use]
    pub fn class(&self, name: &FullName) -> Option<&ClassMetadata> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn enum_type(&self, name: &FullName) -> Option<&EnumMetadata> {
        self.enums.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassMetadata> {
        self.classes.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumMetadata> {
        self.enums.values()
    }

    /// `true` when `class` is `base` or (transitively) derives from it.
    #[must_use]
    pub fn is_equal_or_derive(&self, class: &FullName, base: &FullName) -> bool {
        self.ancestry(class).any(|c| c.full_name() == base)
    }

    /// `class` followed by its base classes, nearest first.
    pub fn ancestry<'a>(&'a self, class: &FullName) -> impl Iterator<Item = &'a ClassMetadata> + 'a {
        let mut next = self.class(class);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.base_class().and_then(|base| self.class(base));
            Some(current)
        })
    }

    /// Every property of `class`, base class properties first.
    #[must_use]
    pub fn all_properties(&self, class: &FullName) -> Vec<&PropertyMetadata> {
        let chain: Vec<_> = self.ancestry(class).collect();
        chain
            .into_iter()
            .rev()
            .flat_map(ClassMetadata::properties)
            .collect()
    }

    /// Looks `name` up on `class` and its bases.
    #[must_use]
    pub fn find_property(&self, class: &FullName, name: &str) -> Option<&PropertyMetadata> {
        self.ancestry(class)
            .find_map(|c| c.property_metadata(name))
    }

    /// Whether instances of `class` collect unknown properties. The setting
    /// lives on the root of the hierarchy.
    #[must_use]
    pub fn allows_unknown_properties(&self, class: &FullName) -> bool {
        self.ancestry(class)
            .last()
            .map_or(false, ClassMetadata::allows_unknown_properties)
    }

    /// The type a key selector path ends in, starting from `class`.
    pub fn key_type(&self, class: &FullName, key_selector: &[String]) -> Result<&LocalType> {
        let (last, init) = key_selector
            .split_last()
            .ok_or_else(|| Error::invalid_metadata(format!("empty key selector on {}", class)))?;
        let mut current = class.clone();
        for step in init {
            let property = self.find_property(&current, step).ok_or_else(|| {
                Error::invalid_metadata(format!("key selector step '{}' not found on {}", step, current))
            })?;
            match property.ty() {
                LocalType::Class(next) => current = next.clone(),
                other => {
                    return Err(Error::invalid_metadata(format!(
                        "key selector step '{}' on {} is {}, not a non-nullable class",
                        step,
                        current,
                        other.kind_name()
                    )))
                }
            }
        }
        self.find_property(&current, last)
            .map(PropertyMetadata::ty)
            .ok_or_else(|| {
                Error::invalid_metadata(format!("key selector step '{}' not found on {}", last, current))
            })
    }

    /// Reads the key of an object-set item by following `key_selector`.
    #[must_use]
    pub fn extract_key(&self, object: &Object, key_selector: &[String]) -> Option<Value> {
        let (last, init) = key_selector.split_last()?;
        let mut current = object;
        for step in init {
            match current.properties.get(step)? {
                Value::Object(next) => current = next,
                _ => return None,
            }
        }
        current.properties.get(last).cloned()
    }

    /// Builds an object-set value, keying each item by `key_selector`.
    pub fn object_set<I>(&self, key_selector: &[String], items: I) -> Result<Value>
    where
        I: IntoIterator<Item = Object>,
    {
        let mut set = IndexMap::new();
        for item in items {
            let key = self.extract_key(&item, key_selector).ok_or_else(|| {
                Error::invalid_value(format!(
                    "object of {} has no key at '{}'",
                    item.class(),
                    key_selector.join(".")
                ))
            })?;
            if set.contains_key(&key) {
                return Err(Error::invalid_value(format!("duplicate object set key {}", key)));
            }
            set.insert(key, item);
        }
        Ok(Value::ObjectSet(set))
    }
}

/// Collects descriptors and validates them into a [`Metadata`].
#[derive(Clone, Debug, Default)]
pub struct MetadataBuilder {
    classes: Vec<ClassMetadata>,
    enums: Vec<EnumMetadata>,
}

impl MetadataBuilder {
    #[must_use]
    pub fn class(mut self, class: ClassMetadata) -> Self {
        self.classes.push(class);
        self
    }

    #[must_use]
    pub fn enum_type(mut self, enum_type: EnumMetadata) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Checks every reference and structural rule, then freezes the universe.
    pub fn build(self) -> Result<Metadata> {
        let mut metadata = Metadata::default();
        for enum_type in self.enums {
            let name = enum_type.full_name().clone();
            if metadata.enums.insert(name.clone(), enum_type).is_some() {
                return Err(Error::invalid_metadata(format!("enum {} is defined twice", name)));
            }
        }
        for class in self.classes {
            let name = class.full_name().clone();
            if metadata.enums.contains_key(&name) {
                return Err(Error::invalid_metadata(format!(
                    "{} is defined as both a class and an enum",
                    name
                )));
            }
            if metadata.classes.insert(name.clone(), class).is_some() {
                return Err(Error::invalid_metadata(format!("class {} is defined twice", name)));
            }
        }
        for enum_type in metadata.enums.values() {
            validate_enum(enum_type)?;
        }
        for class in metadata.classes.values() {
            validate_class(&metadata, class)?;
        }
        Ok(metadata)
    }
}

fn validate_enum(enum_type: &EnumMetadata) -> Result<()> {
    for (name, value) in enum_type.members() {
        if value.kind() != enum_type.underlying() {
            return Err(Error::invalid_metadata(format!(
                "member '{}' of {} is {}, expected {}",
                name,
                enum_type.full_name(),
                value.kind(),
                enum_type.underlying()
            )));
        }
    }
    Ok(())
}

fn validate_class(metadata: &Metadata, class: &ClassMetadata) -> Result<()> {
    let name = class.full_name();
    if let Some(name) = class.redeclared.first() {
        return Err(Error::invalid_metadata(format!(
            "property '{}' is declared twice on {}",
            name,
            class.full_name()
        )));
    }

    let mut seen = IndexSet::new();
    let mut current = Some(class);
    while let Some(c) = current {
        if !seen.insert(c.full_name().clone()) {
            return Err(Error::invalid_metadata(format!(
                "class {} is its own base",
                c.full_name()
            )));
        }
        current = match c.base_class() {
            Some(base) => Some(metadata.class(base).ok_or_else(|| {
                Error::invalid_metadata(format!("base class {} of {} is not defined", base, c.full_name()))
            })?),
            None => None,
        };
    }

    if class.allows_unknown_properties() && class.base_class().is_some() {
        return Err(Error::invalid_metadata(format!(
            "{} derives from another class and cannot declare the unknown-property sink",
            name
        )));
    }

    let mut names = IndexSet::new();
    for property in metadata.all_properties(name) {
        if !names.insert(property.name()) {
            return Err(Error::invalid_metadata(format!(
                "property '{}' of {} hides an inherited property",
                property.name(),
                name
            )));
        }
    }

    for property in class.properties() {
        validate_local_type(metadata, property.ty()).map_err(|err| match err {
            Error::InvalidMetadata(msg) => Error::InvalidMetadata(format!(
                "property '{}' of {}: {}",
                property.name(),
                name,
                msg
            )),
            other => other,
        })?;
    }
    Ok(())
}

fn validate_local_type(metadata: &Metadata, ty: &LocalType) -> Result<()> {
    match ty {
        LocalType::Nullable(inner) => {
            if inner.is_nullable() {
                return Err(Error::invalid_metadata("nullable of nullable"));
            }
            validate_local_type(metadata, inner)
        }
        LocalType::Atom(_) => Ok(()),
        LocalType::Enum(name) => metadata
            .enum_type(name)
            .map(|_| ())
            .ok_or_else(|| Error::invalid_metadata(format!("enum {} is not defined", name))),
        LocalType::Class(name) => metadata
            .class(name)
            .map(|_| ())
            .ok_or_else(|| Error::invalid_metadata(format!("class {} is not defined", name))),
        LocalType::List(item) => validate_local_type(metadata, item),
        LocalType::SimpleSet(item) => {
            validate_simple(item, "set item")?;
            validate_local_type(metadata, item)
        }
        LocalType::ObjectSet {
            class,
            key_selector,
        } => {
            if metadata.class(class).is_none() {
                return Err(Error::invalid_metadata(format!("class {} is not defined", class)));
            }
            let key = metadata.key_type(class, key_selector)?;
            validate_simple(key, "object set key")
        }
        LocalType::Map { key, value } => {
            validate_simple(key, "map key")?;
            validate_local_type(metadata, key)?;
            validate_local_type(metadata, value)
        }
    }
}

fn validate_simple(ty: &LocalType, role: &str) -> Result<()> {
    if ty.is_simple() {
        Ok(())
    } else {
        Err(Error::invalid_metadata(format!(
            "{} must be a non-nullable atom or enum, found {}",
            role, ty
        )))
    }
}
