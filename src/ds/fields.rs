use super::Value;
use indexmap::IndexMap;
use std::fmt;
use std::ops::Index;

/// An insertion-ordered mapping of field names to [`Value`]s.
///
/// `Fields` backs record storage, dictionary export, and the `Map` variant of [`Value`]. Iteration
/// yields entries in insertion order, which is what keeps field declaration order stable through a
/// serialization round trip. Equality is order-independent.
///
/// # Example
/// ```rust
/// # use regson::{Fields, Value};
/// let mut fields = Fields::new();
/// fields.insert("x", Value::from(0));
/// fields.insert("y", Value::from(1));
/// assert_eq!(fields.keys().collect::<Vec<_>>(), ["x", "y"]);
/// assert_eq!(fields.get("y"), Some(&Value::from(1)));
/// ```
///
/// [`Value`]: crate::Value
#[derive(Clone, Default, PartialEq)]
pub struct Fields(IndexMap<String, Value>);

impl Fields {
    /// An empty mapping.
    pub fn new() -> Self {
        Fields(IndexMap::new())
    }

    /// An empty mapping with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Fields(IndexMap::with_capacity(capacity))
    }

    /// Insert a value, replacing and returning any previous value under the same name.
    /// A replaced name keeps its original position.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Get a value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Get a mutable value by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Remove a value by name, preserving the order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    /// The mapping contains the name.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// Iterate values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }
}

impl Index<&str> for Fields {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.0
            .get(name)
            .unwrap_or_else(|| panic!("no field named '{}'", name))
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Fields(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<S: Into<String>> Extend<(S, Value)> for Fields {
    fn extend<I: IntoIterator<Item = (S, Value)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}
