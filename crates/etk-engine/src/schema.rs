//! Knowledge graph schema passthrough

use crate::error::EtkError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema describing the knowledge graph a pipeline produces
///
/// The engine does not interpret the schema; it hands it to modules through
/// [`Resources::kg_schema`](crate::Resources::kg_schema). The only structure
/// it looks at is an optional top-level `fields` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgSchema(Value);

impl KgSchema {
    /// Wrap a schema value
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    /// Parse a schema from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, EtkError> {
        serde_json::from_str(json)
            .map(Self)
            .map_err(|e| EtkError::Config(format!("Invalid knowledge graph schema: {}", e)))
    }

    /// The raw schema value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Names under the schema's `fields` object, if any
    pub fn field_names(&self) -> Vec<&str> {
        self.0
            .get("fields")
            .and_then(Value::as_object)
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// True when the schema declares `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.field_names().contains(&field)
    }
}
