use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A raw column value that could not be converted to its declared backend type
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Cannot coerce '{value}' in column '{column}' to {backend}")]
pub struct CoercionError {
    pub column: String,
    pub value: String,
    pub backend: BackendType,
}

/// Declared coercion target for a column value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[serde(alias = "decimal")]
    Float,
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "varchar", alias = "text", alias = "default", alias = "static")]
    String,
}

impl BackendType {
    /// Convert a raw value. The column is only used to describe failures.
    pub fn coerce(self, column: &str, raw: &str) -> Result<Value, CoercionError> {
        let fail = || CoercionError {
            column: column.to_string(),
            value: raw.to_string(),
            backend: self,
        };

        match self {
            BackendType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(fail),
            BackendType::Int => raw.trim().parse::<i64>().map(Value::from).map_err(|_| fail()),
            BackendType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
                "0" | "false" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            BackendType::String => Ok(Value::String(raw.to_string())),
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendType::Float => "float",
            BackendType::Int => "int",
            BackendType::Boolean => "boolean",
            BackendType::String => "string",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "float" | "decimal" => Ok(BackendType::Float),
            "int" | "integer" => Ok(BackendType::Int),
            "boolean" | "bool" => Ok(BackendType::Boolean),
            "string" | "varchar" | "text" | "default" | "static" => Ok(BackendType::String),
            other => Err(format!("Unknown backend type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn float_accepts_padded_numbers() {
        assert_eq!(BackendType::Float.coerce("qty", " 5 ").unwrap(), json!(5.0));
        assert_eq!(BackendType::Float.coerce("qty", "-2.5").unwrap(), json!(-2.5));
    }

    #[test]
    fn float_rejects_text_and_non_finite() {
        let err = BackendType::Float.coerce("qty", "five").unwrap_err();
        assert_eq!(err.column, "qty");
        assert_eq!(err.backend, BackendType::Float);
        assert!(BackendType::Float.coerce("qty", "NaN").is_err());
        assert!(BackendType::Float.coerce("qty", "inf").is_err());
    }

    #[test]
    fn int_rejects_fractions() {
        assert_eq!(BackendType::Int.coerce("website_id", "2").unwrap(), json!(2));
        assert!(BackendType::Int.coerce("website_id", "2.5").is_err());
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        assert_eq!(BackendType::Boolean.coerce("c", "Yes").unwrap(), json!(true));
        assert_eq!(BackendType::Boolean.coerce("c", "0").unwrap(), json!(false));
        assert!(BackendType::Boolean.coerce("c", "maybe").is_err());
    }

    #[test]
    fn string_keeps_value_verbatim() {
        assert_eq!(BackendType::String.coerce("c", " a b ").unwrap(), json!(" a b "));
    }

    #[test]
    fn names_and_aliases_parse() {
        assert_eq!("varchar".parse::<BackendType>().unwrap(), BackendType::String);
        assert_eq!("Decimal".parse::<BackendType>().unwrap(), BackendType::Float);
        assert!("blob".parse::<BackendType>().is_err());

        let parsed: BackendType = serde_json::from_value(json!("default")).unwrap();
        assert_eq!(parsed, BackendType::String);
    }
}
