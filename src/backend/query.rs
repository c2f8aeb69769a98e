// SPDX-License-Identifier: MPL-2.0

use crate::backend::{CollectionPath, Document};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    NotEqual,
    ArrayContains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Query descriptor: a collection plus optional filters, ordering and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<Filter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op: FilterOp::Equal,
            value: value.into(),
        });
        self
    }

    pub fn where_ne(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op: FilterOp::NotEqual,
            value: value.into(),
        });
        self
    }

    pub fn where_array_contains(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op: FilterOp::ArrayContains,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| {
            let field = doc.field(&f.field);
            match f.op {
                FilterOp::Equal => field == Some(&f.value),
                FilterOp::NotEqual => field.is_some_and(|v| v != &f.value && !v.is_null()),
                FilterOp::ArrayContains => field
                    .and_then(Value::as_array)
                    .is_some_and(|items| items.contains(&f.value)),
            }
        })
    }

    /// Evaluate the query in memory over a collection snapshot.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut out: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if !self.order_by.is_empty() {
            out.sort_by(|a, b| {
                for order in &self.order_by {
                    let ord = compare_values(a.field(&order.field), b.field(&order.field));
                    let ord = match order.direction {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.id.cmp(&b.id)
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Missing fields sort first, then by type, then by value.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::path;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document::new(id, data)
    }

    #[test]
    fn filters_and_orders_descending() {
        let docs = vec![
            doc("a", json!({"authorId": "u1", "createdAt": "2024-01-01T00:00:00.000Z"})),
            doc("b", json!({"authorId": "u2", "createdAt": "2024-01-03T00:00:00.000Z"})),
            doc("c", json!({"authorId": "u1", "createdAt": "2024-01-02T00:00:00.000Z"})),
        ];
        let q = Query::new(path::posts())
            .where_eq("authorId", "u1")
            .order_by("createdAt", Direction::Descending);

        let ids: Vec<_> = q.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn array_contains_and_limit() {
        let docs = vec![
            doc("a", json!({"likedBy": ["u1", "u2"]})),
            doc("b", json!({"likedBy": []})),
            doc("c", json!({"likedBy": ["u2"]})),
        ];
        let q = Query::new(path::posts())
            .where_array_contains("likedBy", "u2")
            .order_by("likedBy", Direction::Ascending)
            .limit(1);

        assert_eq!(q.apply(docs).len(), 1);
    }

    #[test]
    fn not_equal_skips_missing_fields() {
        let docs = vec![
            doc("a", json!({"originalPostId": "p1"})),
            doc("b", json!({})),
        ];
        let q = Query::new(path::posts()).where_ne("originalPostId", Value::Null);
        let ids: Vec<_> = q.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a"]);
    }
}
