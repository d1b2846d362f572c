//! Values handed out by chains.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::EnvChain;
use crate::error::EnvChainError;

/// The current value of a declared field.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// A scalar (or whatever a derivation produced).
    Value(Value),
    /// The live nested chain of a grouped field.
    Group(EnvChain),
}

impl FieldValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&EnvChain> {
        match self {
            Self::Group(chain) => Some(chain),
            Self::Value(_) => None,
        }
    }

    /// String form of a scalar value. Objects, arrays and groups yield `None`.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self.as_value()? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Plain value, rendering a group into a nested object.
    pub fn into_value(self) -> Result<Value, EnvChainError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Group(chain) => Ok(Value::Object(chain.render()?.into_map())),
        }
    }
}

/// Plain snapshot produced by [`EnvChain::render`].
///
/// Keys follow the chain's field order. Unset fields are present with a
/// `null` value. The snapshot owns its data; changing it never affects the
/// chain it came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: String, value: Value) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl From<Snapshot> for Value {
    fn from(snapshot: Snapshot) -> Self {
        Value::Object(snapshot.0)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_strings() {
        assert_eq!(
            FieldValue::Value(json!("x")).to_scalar_string().as_deref(),
            Some("x")
        );
        assert_eq!(
            FieldValue::Value(json!(10)).to_scalar_string().as_deref(),
            Some("10")
        );
        assert_eq!(
            FieldValue::Value(json!(true)).to_scalar_string().as_deref(),
            Some("true")
        );
        assert!(FieldValue::Value(json!({"a": 1})).to_scalar_string().is_none());
    }

    #[test]
    fn test_snapshot_keeps_insertion_order() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("B".into(), json!("b"));
        snapshot.insert("A".into(), json!("a"));

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(snapshot.to_string(), r#"{"B":"b","A":"a"}"#);
    }
}
