use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while turning upstream data into rows
#[derive(Debug, Error)]
pub enum RowError {
    #[error("Row {line}: expected a JSON object, got {kind}")]
    NotAnObject { line: usize, kind: &'static str },

    #[error("Row {line}: column '{column}' holds a nested value")]
    NestedValue { line: usize, column: String },
}

/// One record of the source dataset: an ordered column → raw value mapping.
///
/// Rows are read-only for the observers. An empty string is treated the same
/// as a missing column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based position in the source, used when reporting failures
    pub line: usize,
    columns: Vec<(String, String)>,
}

impl Row {
    pub fn new(line: usize) -> Self {
        Self { line, columns: Vec::new() }
    }

    /// Build a row from column/value pairs, keeping their order
    pub fn from_pairs<I, K, V>(line: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new(line);
        for (column, value) in pairs {
            row.set(column, value);
        }
        row
    }

    /// Build a row from a JSON object whose values are scalars.
    /// Numbers and booleans keep their textual form; null becomes an empty value.
    pub fn from_json(line: usize, value: &Value) -> Result<Self, RowError> {
        let object: &Map<String, Value> = match value {
            Value::Object(map) => map,
            Value::Array(_) => return Err(RowError::NotAnObject { line, kind: "array" }),
            Value::String(_) => return Err(RowError::NotAnObject { line, kind: "string" }),
            Value::Number(_) => return Err(RowError::NotAnObject { line, kind: "number" }),
            Value::Bool(_) => return Err(RowError::NotAnObject { line, kind: "boolean" }),
            Value::Null => return Err(RowError::NotAnObject { line, kind: "null" }),
        };

        let mut row = Self::new(line);
        for (column, value) in object {
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(RowError::NestedValue { line, column: column.clone() })
                }
            };
            row.set(column.clone(), raw);
        }
        Ok(row)
    }

    /// Set a column, replacing an existing value in place
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.columns.push((column, value)),
        }
        self
    }

    /// Raw value of a column; `None` when the column is missing or empty
    pub fn value(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|(name, _)| name == column)
    }

    /// Column names in source order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values_read_as_absent() {
        let row = Row::from_pairs(1, [("sku", "SKU1"), ("qty", "")]);
        assert_eq!(row.value("sku"), Some("SKU1"));
        assert_eq!(row.value("qty"), None);
        assert!(row.has_column("qty"));
        assert_eq!(row.value("missing"), None);
    }

    #[test]
    fn set_replaces_without_reordering() {
        let mut row = Row::from_pairs(3, [("sku", "A"), ("qty", "1")]);
        row.set("sku", "B");
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["sku", "qty"]);
        assert_eq!(row.value("sku"), Some("B"));
    }

    #[test]
    fn json_scalars_become_text() {
        let row = Row::from_json(2, &json!({"sku": "SKU1", "qty": 5, "flag": true, "note": null}))
            .unwrap();
        assert_eq!(row.value("qty"), Some("5"));
        assert_eq!(row.value("flag"), Some("true"));
        assert_eq!(row.value("note"), None);
    }

    #[test]
    fn json_rejects_nested_values() {
        let err = Row::from_json(4, &json!({"sku": ["a"]})).unwrap_err();
        assert!(matches!(err, RowError::NestedValue { line: 4, .. }));

        let err = Row::from_json(5, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, RowError::NotAnObject { line: 5, kind: "array" }));
    }
}
