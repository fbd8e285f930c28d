//! Knowledge graph accumulation

use crate::error::PathError;
use crate::path_index::PathIndex;
use crate::segment::Segment;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output of document processing: field name → extracted values
///
/// Fields keep the order in which they were first written; values keep the
/// order in which they were added. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeGraph {
    fields: IndexMap<String, Vec<Value>>,
}

impl KnowledgeGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to `field`
    pub fn add_value(&mut self, field: &str, value: impl Into<Value>) {
        self.values_mut(field).push(value.into());
    }

    /// Append several values to `field`, in order
    ///
    /// Nothing is written, not even an empty field, when `values` is empty.
    pub fn extend<I, V>(&mut self, field: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut values = values.into_iter().map(Into::into).peekable();
        if values.peek().is_none() {
            return;
        }
        self.values_mut(field).extend(values);
    }

    fn values_mut(&mut self, field: &str) -> &mut Vec<Value> {
        let index = match self.fields.get_index_of(field) {
            Some(index) => index,
            None => self.fields.insert_full(field.to_string(), Vec::new()).0,
        };
        &mut self.fields[index]
    }

    /// Values accumulated for `field`
    pub fn get(&self, field: &str) -> Option<&[Value]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// True when `field` has been written
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names in first-write order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over fields and their values
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of values across all fields
    pub fn value_count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// JSON view: an object mapping each field to an array of values
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::Array(v.clone())))
            .collect();
        Value::Object(map)
    }

    /// Address accumulated values with a path query over [`to_json`](Self::to_json)
    pub fn select(&self, query: &str, index: &PathIndex) -> Result<Vec<Segment>, PathError> {
        index.resolve(query, &self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_and_get() {
        let mut kg = KnowledgeGraph::new();
        kg.add_value("developer", "Pedro");
        kg.add_value("developer", "Pedro");
        kg.add_value("project", json!({"name": "rltk"}));

        assert_eq!(kg.get("developer").unwrap(), [json!("Pedro"), json!("Pedro")]);
        assert_eq!(kg.len(), 2);
        assert_eq!(kg.value_count(), 3);
        assert!(kg.get("missing").is_none());
    }

    #[test]
    fn test_fields_keep_first_write_order() {
        let mut kg = KnowledgeGraph::new();
        kg.add_value("zeta", 1);
        kg.add_value("alpha", 2);
        kg.add_value("zeta", 3);
        assert_eq!(kg.fields().collect::<Vec<_>>(), ["zeta", "alpha"]);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut kg = KnowledgeGraph::new();
        kg.extend("n", [1, 2, 3]);
        kg.extend("n", Vec::<Value>::new());
        assert_eq!(kg.get("n").unwrap(), [json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_extend_with_nothing_creates_no_field() {
        let mut kg = KnowledgeGraph::new();
        kg.extend("developer", Vec::<Value>::new());
        assert!(!kg.contains_field("developer"));
        assert_eq!(kg.to_json(), json!({}));
    }

    #[test]
    fn test_serializes_as_object_of_arrays() {
        let mut kg = KnowledgeGraph::new();
        kg.add_value("developer", "Mayank");
        assert_eq!(
            serde_json::to_value(&kg).unwrap(),
            json!({"developer": ["Mayank"]})
        );
        assert_eq!(kg.to_json(), json!({"developer": ["Mayank"]}));
    }

    #[test]
    fn test_select_by_path() {
        let mut kg = KnowledgeGraph::new();
        kg.extend("developer", ["Pedro", "Mayank"]);
        kg.add_value("project", json!({"name": "rltk"}));

        let index = PathIndex::new();
        let names: Vec<Value> = kg
            .select("developer[*]", &index)
            .unwrap()
            .into_iter()
            .map(|s| s.value().clone())
            .collect();
        assert_eq!(names, [json!("Pedro"), json!("Mayank")]);

        let project = kg.select("project[0].name", &index).unwrap();
        assert_eq!(project[0].value(), &json!("rltk"));
    }

    #[test]
    fn test_select_invalid_path() {
        let kg = KnowledgeGraph::new();
        assert!(kg.select("developer[", &PathIndex::new()).is_err());
    }
}
