//! Directus filter expressions
//!
//! [`Filter`] mirrors the subset of the Directus filter language the
//! dashboard needs: logical `_and` / `_or` and the field operators
//! `_eq`, `_neq`, `_in`, `_gte`, `_lte` and `_starts_with`. It serializes
//! to the JSON the items endpoint expects and can be evaluated locally
//! against a row (see [`eval`]).

pub mod builder;
pub mod eval;

pub use builder::{
    history_filter, org_filter, path_filter, related_orgs_filter, FilterCriteria, PathMatch,
    SearchCriteria,
};

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Field operator
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Value),
    Neq(Value),
    In(Vec<Value>),
    Gte(Value),
    Lte(Value),
    StartsWith(String),
}

impl Predicate {
    /// Directus operator keyword
    pub fn operator(&self) -> &'static str {
        match self {
            Predicate::Eq(_) => "_eq",
            Predicate::Neq(_) => "_neq",
            Predicate::In(_) => "_in",
            Predicate::Gte(_) => "_gte",
            Predicate::Lte(_) => "_lte",
            Predicate::StartsWith(_) => "_starts_with",
        }
    }

    fn operand(&self) -> Value {
        match self {
            Predicate::Eq(v) | Predicate::Neq(v) | Predicate::Gte(v) | Predicate::Lte(v) => {
                v.clone()
            }
            Predicate::In(values) => Value::Array(values.clone()),
            Predicate::StartsWith(prefix) => Value::String(prefix.clone()),
        }
    }
}

/// Filter expression over the fields of one collection
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Field { field: String, predicate: Predicate },
}

impl Filter {
    pub fn field(field: impl Into<String>, predicate: Predicate) -> Self {
        Filter::Field {
            field: field.into(),
            predicate,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Predicate::Eq(value.into()))
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Predicate::Neq(value.into()))
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::field(field, Predicate::In(values))
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Predicate::Gte(value.into()))
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Predicate::Lte(value.into()))
    }

    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::field(field, Predicate::StartsWith(prefix.into()))
    }

    /// Conjunction; `other` is appended to an existing `And`
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut clauses) => {
                clauses.push(other);
                Filter::And(clauses)
            }
            single => Filter::And(vec![single, other]),
        }
    }

    /// Directus JSON form of the expression
    pub fn to_json(&self) -> Value {
        match self {
            Filter::And(clauses) => {
                json!({ "_and": clauses.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
            Filter::Or(clauses) => {
                json!({ "_or": clauses.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
            Filter::Field { field, predicate } => {
                let mut op = Map::new();
                op.insert(predicate.operator().to_string(), predicate.operand());
                let mut outer = Map::new();
                outer.insert(field.clone(), Value::Object(op));
                Value::Object(outer)
            }
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_to_json() {
        let filter = Filter::starts_with("T_PATH", "001");
        assert_eq!(filter.to_json(), json!({"T_PATH": {"_starts_with": "001"}}));

        let filter = Filter::is_in("ORG_ID", vec![json!(1), json!(2)]);
        assert_eq!(filter.to_json(), json!({"ORG_ID": {"_in": [1, 2]}}));
    }

    #[test]
    fn test_nested_to_json() {
        let filter = Filter::And(vec![
            Filter::eq("CONFIDENTIALITY_LEVEL", 1),
            Filter::Or(vec![
                Filter::starts_with("T_PATH", "001"),
                Filter::eq("T_PATH", "002"),
            ]),
        ]);
        assert_eq!(
            filter.to_json(),
            json!({"_and": [
                {"CONFIDENTIALITY_LEVEL": {"_eq": 1}},
                {"_or": [
                    {"T_PATH": {"_starts_with": "001"}},
                    {"T_PATH": {"_eq": "002"}}
                ]}
            ]})
        );
    }

    #[test]
    fn test_and_appends() {
        let filter = Filter::eq("a", 1).and(Filter::eq("b", 2)).and(Filter::eq("c", 3));
        match filter {
            Filter::And(clauses) => assert_eq!(clauses.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let filter = Filter::neq("T_PATH", "001");
        let text = serde_json::to_string(&filter).unwrap();
        assert_eq!(text, r#"{"T_PATH":{"_neq":"001"}}"#);
    }
}
