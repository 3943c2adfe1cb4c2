//! Untyped documents and equality filters

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DbError;

/// A schemaless document body as held by a store
pub type Document = Map<String, Value>;

/// A document together with the id assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub body: Document,
}

impl StoredDocument {
    /// Flatten into a single object with the id under the `id` key
    pub fn into_value(self) -> Value {
        let mut body = self.body;
        body.insert("id".to_string(), Value::String(self.id));
        Value::Object(body)
    }
}

/// Conjunction of equality conditions on top-level document fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Check whether a document satisfies every condition
    ///
    /// A missing field compares equal to `null`, matching SQL `IS` semantics.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| values_equal(doc.get(field).unwrap_or(&Value::Null), expected))
    }
}

/// JSON equality that treats `1` and `1.0` as the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Serialize a record into a document body, dropping the `id` key
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, DbError> {
    match serde_json::to_value(record)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(DbError::InvalidRecord(format!(
            "expected an object, got {}",
            other
        ))),
    }
}
