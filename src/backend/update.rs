// SPDX-License-Identifier: MPL-2.0

use serde_json::{Map, Value};

/// A single field mutation inside an update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(Value),
    /// Append each value that is not already present.
    ArrayUnion(Vec<Value>),
    /// Remove every occurrence of each value.
    ArrayRemove(Vec<Value>),
    Delete,
}

/// Partial update of a document: field sets plus array union/remove ops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    fields: Vec<(String, FieldUpdate)>,
}

impl DocumentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields
            .push((field.to_string(), FieldUpdate::Set(value.into())));
        self
    }

    pub fn array_union(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields
            .push((field.to_string(), FieldUpdate::ArrayUnion(vec![value.into()])));
        self
    }

    pub fn array_remove(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields
            .push((field.to_string(), FieldUpdate::ArrayRemove(vec![value.into()])));
        self
    }

    pub fn delete_field(mut self, field: &str) -> Self {
        self.fields.push((field.to_string(), FieldUpdate::Delete));
        self
    }

    /// Either union or remove, depending on `present`.
    pub fn array_toggle(self, field: &str, value: impl Into<Value>, present: bool) -> Self {
        if present {
            self.array_union(field, value)
        } else {
            self.array_remove(field, value)
        }
    }

    pub fn fields(&self) -> &[(String, FieldUpdate)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Payload shape reported alongside permission errors.
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        for (field, update) in &self.fields {
            let v = match update {
                FieldUpdate::Set(v) => v.clone(),
                FieldUpdate::ArrayUnion(vs) => serde_json::json!({ "arrayUnion": vs }),
                FieldUpdate::ArrayRemove(vs) => serde_json::json!({ "arrayRemove": vs }),
                FieldUpdate::Delete => serde_json::json!({ "delete": true }),
            };
            out.insert(field.clone(), v);
        }
        Value::Object(out)
    }

    /// Apply to a document body in place.
    pub fn apply_to(&self, data: &mut Map<String, Value>) {
        for (field, update) in &self.fields {
            match update {
                FieldUpdate::Set(v) => {
                    data.insert(field.clone(), v.clone());
                }
                FieldUpdate::Delete => {
                    data.remove(field);
                }
                FieldUpdate::ArrayUnion(values) => {
                    let entry = data
                        .entry(field.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if !entry.is_array() {
                        *entry = Value::Array(Vec::new());
                    }
                    if let Value::Array(items) = entry {
                        for v in values {
                            if !items.contains(v) {
                                items.push(v.clone());
                            }
                        }
                    }
                }
                FieldUpdate::ArrayRemove(values) => {
                    match data.get_mut(field) {
                        Some(Value::Array(items)) => items.retain(|i| !values.contains(i)),
                        // Removing from a non-array leaves an empty array behind
                        _ => {
                            data.insert(field.clone(), Value::Array(Vec::new()));
                        }
                    }
                }
            }
        }
    }
}
