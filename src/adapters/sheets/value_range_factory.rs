use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::sheets::a1_notation::A1Notation;

pub trait ValueRangeFactory {
    fn from_count(range: &A1Notation, count: u64) -> Self;
    fn from_str<T: AsRef<str>>(range: &A1Notation, s: T) -> Self;
}

fn single_cell(range: &A1Notation, value: Value) -> ValueRange {
    ValueRange {
        major_dimension: Some("ROWS".to_string()),
        range: Some(range.to_string()),
        values: Some(vec![vec![value]]),
    }
}

impl ValueRangeFactory for ValueRange {
    fn from_count(range: &A1Notation, count: u64) -> Self {
        single_cell(range, Value::from(count))
    }

    fn from_str<T: AsRef<str>>(range: &A1Notation, s: T) -> Self {
        single_cell(range, Value::String(s.as_ref().to_owned()))
    }
}

/// Reads a cell of a `values.get` response as text. Missing trailing cells
/// (the API trims them) read as empty.
pub fn cell_text(row: &[Value], index: usize) -> String {
    match row.get(index) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> A1Notation {
        "Tally!B2".parse().unwrap()
    }

    #[test]
    fn test_from_count_is_numeric() {
        let value_range = ValueRange::from_count(&range(), 42);
        assert_eq!(value_range.range.as_deref(), Some("Tally!B2"));
        assert_eq!(value_range.major_dimension.as_deref(), Some("ROWS"));
        assert_eq!(value_range.values, Some(vec![vec![Value::from(42u64)]]));
    }

    #[test]
    fn test_from_str() {
        let value_range = ValueRange::from_str(&range(), "VoteTally - Eng");
        assert_eq!(
            value_range.values,
            Some(vec![vec![Value::String("VoteTally - Eng".to_string())]])
        );
    }

    #[test]
    fn test_cell_text() {
        let row = vec![
            Value::String(" Save the park ".to_string()),
            Value::from(7),
            Value::Null,
        ];
        assert_eq!(cell_text(&row, 0), "Save the park");
        assert_eq!(cell_text(&row, 1), "7");
        assert_eq!(cell_text(&row, 2), "");
        assert_eq!(cell_text(&row, 9), "");
    }
}
