//! The dynamically typed value tree.

use crate::location::Location;
use crate::path::{Path, PathComponent, PathError};
use indexmap::IndexMap;
use std::fmt;

/// Mapping entries in insertion order. Keys are unique.
pub type Mapping = IndexMap<String, Value>;

/// The kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Invalid,
    Null,
    Bool,
    Int,
    Float,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Invalid => "invalid",
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Mapping => "map",
        };
        f.write_str(name)
    }
}

/// A configuration node with an optional source location.
///
/// `Invalid` marks the absence of a value (a failed conversion, a lookup
/// miss); it is never written by a loader.
///
/// Equality is structural: kinds and contents are compared recursively and
/// locations are ignored. Mapping equality does not depend on key order.
#[derive(Debug, Clone)]
pub struct Value {
    data: Data,
    location: Option<Location>,
}

#[derive(Debug, Clone)]
enum Data {
    Invalid,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    fn from_data(data: Data) -> Self {
        Self {
            data,
            location: None,
        }
    }

    pub fn invalid() -> Self {
        Self::from_data(Data::Invalid)
    }

    pub fn null() -> Self {
        Self::from_data(Data::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::from_data(Data::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::from_data(Data::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::from_data(Data::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::from_data(Data::String(value.into()))
    }

    pub fn sequence(items: Vec<Value>) -> Self {
        Self::from_data(Data::Sequence(items))
    }

    pub fn mapping(entries: Mapping) -> Self {
        Self::from_data(Data::Mapping(entries))
    }

    /// Build a mapping from `(key, value)` pairs, keeping their order.
    ///
    /// A repeated key keeps its first position and its last value.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::mapping(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Replace the location of this value.
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Attach a location to this value.
    pub fn at(self, location: Location) -> Self {
        self.with_location(Some(location))
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn kind(&self) -> Kind {
        match &self.data {
            Data::Invalid => Kind::Invalid,
            Data::Null => Kind::Null,
            Data::Bool(_) => Kind::Bool,
            Data::Int(_) => Kind::Int,
            Data::Float(_) => Kind::Float,
            Data::String(_) => Kind::String,
            Data::Sequence(_) => Kind::Sequence,
            Data::Mapping(_) => Kind::Mapping,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.data, Data::Invalid)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, Data::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.data {
            Data::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.data {
            Data::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match &self.data {
            Data::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.data {
            Data::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a mapping entry. Returns `None` for non-mappings.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Look up a sequence item. Returns `None` for non-sequences.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_sequence().and_then(|items| items.get(index))
    }

    /// Resolve `path` against this value.
    ///
    /// Fails with [`PathError::NotFound`] naming the first component that is
    /// absent, or that is applied to a node of the wrong kind (a key on a
    /// sequence, an index on a mapping, anything on a scalar).
    pub fn get(&self, path: &Path) -> Result<&Value, PathError> {
        let mut current = self;
        for (depth, component) in path.components().iter().enumerate() {
            let next = match component {
                PathComponent::Key(key) => current.get_key(key),
                PathComponent::Index(index) => current.get_index(*index),
            };
            current = next.ok_or_else(|| PathError::NotFound {
                path: Path::new(path.components()[..=depth].to_vec()),
            })?;
        }
        Ok(current)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (Data::Invalid, Data::Invalid) => true,
            (Data::Null, Data::Null) => true,
            (Data::Bool(a), Data::Bool(b)) => a == b,
            (Data::Int(a), Data::Int(b)) => a == b,
            // NaN equals NaN so that a tree always equals itself
            (Data::Float(a), Data::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Data::String(a), Data::String(b)) => a == b,
            (Data::Sequence(a), Data::Sequence(b)) => a == b,
            (Data::Mapping(a), Data::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str) -> Value {
        Value::from_pairs([("name", Value::string(name))])
    }

    fn tree() -> Value {
        Value::from_pairs([
            (
                "include",
                Value::sequence(vec![Value::string("a.yml"), Value::string("b.yml")]),
            ),
            (
                "resources",
                Value::from_pairs([("jobs", Value::from_pairs([("job0", job("job_0"))]))]),
            ),
        ])
    }

    #[test]
    fn test_get() {
        let root = tree();

        let name = root.get(&"resources.jobs.job0.name".parse().unwrap()).unwrap();
        assert_eq!(name.as_str(), Some("job_0"));

        let include = root.get(&"include[1]".parse().unwrap()).unwrap();
        assert_eq!(include.as_str(), Some("b.yml"));

        assert_eq!(root.get(&Path::empty()).unwrap(), &root);
    }

    #[test]
    fn test_get_not_found() {
        let root = tree();

        let err = root.get(&"resources.jobs.job1.name".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "no value at 'resources.jobs.job1'");

        // index into a mapping
        let err = root.get(&"resources[0]".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "no value at 'resources[0]'");

        // key into a scalar
        let err = root.get(&"include[0].name".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "no value at 'include[0].name'");

        // out of range
        assert!(root.get(&"include[2]".parse().unwrap()).is_err());
    }

    #[test]
    fn test_equality_ignores_location() {
        let a = Value::string("x").at(Location::new("a.yml", 1, 1));
        let b = Value::string("x").at(Location::new("b.yml", 9, 9));
        assert_eq!(a, b);
        assert_eq!(a, Value::string("x"));
    }

    #[test]
    fn test_equality_compares_kind() {
        assert_ne!(Value::int(1), Value::float(1.0));
        assert_ne!(Value::string("1"), Value::int(1));
        assert_ne!(Value::null(), Value::invalid());
        assert_eq!(Value::null(), Value::null());
    }

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Value::float(f64::NAN), Value::float(f64::NAN));
        assert_eq!(Value::float(0.0), Value::float(-0.0));
        assert_ne!(Value::float(f64::NAN), Value::float(1.0));

        let tree = Value::from_pairs([("x", Value::float(f64::NAN))]);
        assert_eq!(tree, tree.clone());
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        let a = Value::from_pairs([("x", Value::int(1)), ("y", Value::int(2))]);
        let b = Value::from_pairs([("y", Value::int(2)), ("x", Value::int(1))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequence_equality_is_positional() {
        let a = Value::sequence(vec![Value::int(1), Value::int(2)]);
        let b = Value::sequence(vec![Value::int(2), Value::int(1)]);
        let c = Value::sequence(vec![Value::int(1)]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_clone_keeps_location() {
        let loc = Location::new("bundle.yml", 4, 3);
        let value = job("job_0").at(loc.clone());
        let copy = value.clone();
        assert_eq!(copy.location(), Some(&loc));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Mapping.to_string(), "map");
        assert_eq!(Value::sequence(vec![]).kind().to_string(), "sequence");
    }
}
