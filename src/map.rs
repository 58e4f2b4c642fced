//! Ordered property storage for class values.
//!
//! [`PropertyMap`] wraps an [`IndexMap`] so properties iterate in the order
//! they were read from a document (untyped objects) or set by the loader
//! (typed objects). The saver writes typed objects in metadata-declared order
//! regardless, so insertion order only shows through for untyped graphs and
//! unknown properties.
//!
//! Equality ignores order: two maps are equal when they hold the same keys
//! with equal values.
//!
//! ## Examples
//!
//! ```rust
//! use sdata::{PropertyMap, Value};
//!
//! let mut map = PropertyMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::Value;
use indexmap::IndexMap;

/// Insertion-ordered map of property names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap(IndexMap<String, Value>);

impl PropertyMap {
    #[must_use]
    pub fn new() -> Self {
        PropertyMap(IndexMap::new())
    }

    /// Inserts a property, returning the previous value if the name was
    /// already present. The original position is kept on replacement.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        PropertyMap(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_insertion_order() {
        let map: PropertyMap = [("b", Value::from(1)), ("a", Value::from(2))]
            .into_iter()
            .collect();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let left: PropertyMap = [("x", Value::from(1)), ("y", Value::from(2))]
            .into_iter()
            .collect();
        let right: PropertyMap = [("y", Value::from(2)), ("x", Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_get_mut_replaces_in_place() {
        let mut map: PropertyMap = [("a", Value::from(1)), ("b", Value::from(2))]
            .into_iter()
            .collect();
        if let Some(value) = map.get_mut("a") {
            *value = Value::from("one");
        }
        assert_eq!(map.get("a").and_then(Value::as_str), Some("one"));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
