//! Dynamic, string-keyed row values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::error::CollectionError;

/// One row of data projected onto a view template.
///
/// Keys keep their insertion order. Values are not validated here: a key the
/// template expects but the row lacks is simply absent at render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, returning the extended row.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identity key of this row under `id_key`, if the caller supplied one.
    ///
    /// Only strings and numbers count as identifiers. The key is tagged with
    /// its kind, so `1` and `"1"` never identify the same row.
    pub fn identity(&self, id_key: &str) -> Option<String> {
        match self.0.get(id_key)? {
            Value::String(s) => Some(format!("s:{}", s)),
            Value::Number(n) => Some(format!("n:{}", n)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Row {
    type Error = CollectionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CollectionError::InvalidRow {
                found: value_kind(&other),
            }),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
