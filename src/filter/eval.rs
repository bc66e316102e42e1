//! Local evaluation of filter expressions against JSON rows

use super::{Filter, Predicate};
use crate::schema::Row;
use crate::stats::timeline::parse_timestamp;
use serde_json::Value;
use std::cmp::Ordering;

impl Filter {
    /// Whether `row` satisfies the expression.
    ///
    /// An empty `Or` matches nothing and an empty `And` matches
    /// everything. A missing or null field fails every operator except
    /// `_neq` (and `_eq null`).
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::And(clauses) => clauses.iter().all(|c| c.matches(row)),
            Filter::Or(clauses) => clauses.iter().any(|c| c.matches(row)),
            Filter::Field { field, predicate } => {
                let value = row.get(field).unwrap_or(&Value::Null);
                predicate.matches(value)
            }
        }
    }
}

impl Predicate {
    /// Apply the operator to a single field value
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Predicate::Eq(expected) => values_equal(value, expected),
            Predicate::Neq(expected) => !values_equal(value, expected),
            Predicate::In(candidates) => candidates.iter().any(|c| values_equal(value, c)),
            Predicate::Gte(bound) => matches!(
                compare_values(value, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::Lte(bound) => matches!(
                compare_values(value, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Predicate::StartsWith(prefix) => match value {
                Value::String(s) => s.starts_with(prefix.as_str()),
                Value::Number(n) => n.to_string().starts_with(prefix.as_str()),
                _ => false,
            },
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ => compare_values(a, b) == Some(Ordering::Equal),
    }
}

/// Order two scalars. Two strings compare chronologically when both read
/// as timestamps and as text otherwise, so "001" and "01" stay distinct
/// paths. A number against a number or numeric string compares by value.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(tx), Some(ty)) => Some(tx.cmp(&ty)),
                _ => Some(x.as_str().cmp(y.as_str())),
            }
        }
        _ => {
            let (x, y) = (as_number(a)?, as_number(b)?);
            x.partial_cmp(&y)
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_eq_is_lenient_about_number_strings() {
        let r = row(json!({"ORG_ID": 12, "CODE": "12"}));
        assert!(Filter::eq("ORG_ID", "12").matches(&r));
        assert!(Filter::eq("CODE", 12).matches(&r));
        assert!(!Filter::eq("ORG_ID", 13).matches(&r));
    }

    #[test]
    fn test_missing_fields() {
        let r = row(json!({"T_PATH": null}));
        assert!(!Filter::eq("T_PATH", "001").matches(&r));
        assert!(Filter::neq("T_PATH", "001").matches(&r));
        assert!(!Filter::starts_with("T_PATH", "0").matches(&r));
        assert!(!Filter::is_in("ORG_ID", vec![json!(1)]).matches(&r));
        assert!(!Filter::gte("PUB_TIME", "2023-01-01").matches(&r));
        assert!(Filter::eq("T_PATH", Value::Null).matches(&r));
    }

    #[test]
    fn test_range_on_timestamps() {
        let r = row(json!({"PUB_TIME": "2023-03-15T08:00:00"}));
        assert!(Filter::gte("PUB_TIME", "2023-03-01T00:00:00").matches(&r));
        assert!(Filter::lte("PUB_TIME", "2023-03-15T08:00:00").matches(&r));
        assert!(!Filter::gte("PUB_TIME", "2023-04-01T00:00:00Z").matches(&r));
        // Date-only bound
        assert!(Filter::lte("PUB_TIME", "2023-03-16").matches(&r));
    }

    #[test]
    fn test_range_on_numbers() {
        let r = row(json!({"SORT_ID": 10}));
        assert!(Filter::gte("SORT_ID", 10).matches(&r));
        assert!(Filter::lte("SORT_ID", 11).matches(&r));
        assert!(!Filter::lte("SORT_ID", 9).matches(&r));
    }

    #[test]
    fn test_logical() {
        let r = row(json!({"T_PATH": "001002", "release_status": 1}));
        let filter = Filter::And(vec![
            Filter::Or(vec![
                Filter::starts_with("T_PATH", "002"),
                Filter::starts_with("T_PATH", "001"),
            ]),
            Filter::eq("release_status", 1),
        ]);
        assert!(filter.matches(&r));
        assert!(!Filter::Or(vec![]).matches(&r));
        assert!(Filter::And(vec![]).matches(&r));
    }
}
