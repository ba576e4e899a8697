use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Literal value as written in a variable spec.
///
/// Text values are either numeric literals (`"10"`, `"2.5"`) or references to
/// an earlier variable by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    pub fn text(value: impl Into<String>) -> Self {
        RawValue::Text(value.into())
    }

    /// Numeric reading of the literal itself, without consulting other variables.
    pub fn literal_number(&self) -> Option<Number> {
        match self {
            RawValue::Int(value) => Some(Number::Int(*value)),
            RawValue::Float(value) => Some(Number::Float(*value)),
            RawValue::Text(value) => Number::parse(value),
        }
    }

    /// Variable name this value refers to, if it is not a numeric literal.
    pub fn reference(&self) -> Option<&str> {
        match self {
            RawValue::Text(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() || Number::parse(trimmed).is_some() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(value) => write!(f, "{value}"),
            RawValue::Float(value) => f.write_str(&format_float(*value)),
            RawValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(i64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Resolved numeric value used for loop counts, bounds and lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Parse a trimmed numeric literal. Integers win over floats.
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(value) = text.parse::<i64>() {
            return Some(Number::Int(value));
        }
        let numeric_chars = text
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E'));
        if !numeric_chars {
            return None;
        }
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Number::Float)
    }

    /// Parse a string made only of ASCII digits.
    pub fn parse_digits(text: &str) -> Option<Number> {
        let text = text.trim();
        if text.is_empty() || !text.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        text.parse::<i64>().ok().map(Number::Int)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    /// Integer reading; floats truncate toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(value) => value,
            Number::Float(value) => value.trunc() as i64,
        }
    }

    pub fn plus_one(self) -> Number {
        match self {
            Number::Int(value) => Number::Int(value.saturating_add(1)),
            Number::Float(value) => Number::Float(value + 1.0),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Float(value) => f.write_str(&format_float(*value)),
        }
    }
}

/// Render a float the way test files expect: whole numbers keep one decimal.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_before_float() {
        assert_eq!(Number::parse(" 42 "), Some(Number::Int(42)));
        assert_eq!(Number::parse("-3"), Some(Number::Int(-3)));
        assert_eq!(Number::parse("2.5"), Some(Number::Float(2.5)));
        assert_eq!(Number::parse("inf"), None);
        assert_eq!(Number::parse("n"), None);
    }

    #[test]
    fn digits_only_rejects_signs() {
        assert_eq!(Number::parse_digits("17"), Some(Number::Int(17)));
        assert_eq!(Number::parse_digits("-17"), None);
        assert_eq!(Number::parse_digits("1.0"), None);
    }

    #[test]
    fn reference_ignores_numeric_text() {
        assert_eq!(RawValue::text("n").reference(), Some("n"));
        assert_eq!(RawValue::text(" len ").reference(), Some("len"));
        assert_eq!(RawValue::text("12").reference(), None);
        assert_eq!(RawValue::Int(3).reference(), None);
    }

    #[test]
    fn floats_keep_one_decimal_when_whole() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(3.25), "3.25");
        assert_eq!(format_float(-0.5), "-0.5");
    }
}
