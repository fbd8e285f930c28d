//! Segments - resolved, addressable locations in a document tree

use crate::path::Location;
use serde_json::Value;
use std::borrow::Cow;

/// A value found by a path query, together with where it was found
///
/// Segments are snapshots: they hold a copy of the value at resolution time
/// and stay valid as write targets for [`Document::store`](crate::Document::store)
/// because stores only ever add fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    query: String,
    location: Location,
    value: Value,
}

impl Segment {
    pub(crate) fn new(query: &str, location: Location, value: Value) -> Self {
        Self {
            query: query.to_string(),
            location,
            value,
        }
    }

    /// The path query that produced this segment
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Concrete location in the tree
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Canonical path of the location, e.g. `projects[0].description`
    pub fn path(&self) -> String {
        self.location.to_string()
    }

    /// The value at the location
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Text view of the value
    ///
    /// Strings are borrowed, numbers and booleans are rendered, and null,
    /// arrays and objects have no text.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        value_text(&self.value)
    }
}

pub(crate) fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
