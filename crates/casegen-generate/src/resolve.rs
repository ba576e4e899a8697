//! Forward-only resolution of literals and variable references.
//!
//! Loop counts, range bounds and string lengths all go through
//! [`resolve_number`]: numeric literal, digit string, earlier scalar
//! variable, then a last direct parse. Anything else falls back to the
//! caller's default.

use casegen_core::{
    DEFAULT_LOOP_COUNT, DEFAULT_STRING_LENGTH, LengthSpec, Number, RawValue,
};
use rand::Rng;

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

/// Bound used when a range bound cannot be resolved.
pub const DEFAULT_BOUND: Number = Number::Int(0);

/// Value(s) recorded for a variable within one group.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Scalar(GeneratedValue),
    Sequence(Vec<GeneratedValue>),
}

/// Name to value map for the group being built, in spec order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedValues {
    entries: Vec<(String, Resolved)>,
}

impl ResolvedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the values generated for `name`: a scalar when exactly one
    /// value was produced, otherwise the ordered sequence.
    pub fn insert(&mut self, name: &str, mut values: Vec<GeneratedValue>) {
        let resolved = if values.len() == 1 {
            Resolved::Scalar(values.remove(0))
        } else {
            Resolved::Sequence(values)
        };
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| key == name) {
            entry.1 = resolved;
        } else {
            self.entries.push((name.to_string(), resolved));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Resolved> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

/// Resolve a raw value to a number, or `None` when nothing applies.
///
/// A reference to a variable that produced a sequence is invalid.
pub fn resolve_number(raw: &RawValue, resolved: &ResolvedValues) -> Option<Number> {
    match raw {
        RawValue::Int(value) => Some(Number::Int(*value)),
        RawValue::Float(value) => Some(Number::Float(*value)),
        RawValue::Text(text) => {
            let text = text.trim();
            if let Some(number) = Number::parse_digits(text) {
                return Some(number);
            }
            if let Some(entry) = resolved.get(text) {
                return match entry {
                    Resolved::Scalar(value) => value.as_number(),
                    Resolved::Sequence(_) => None,
                };
            }
            Number::parse(text)
        }
    }
}

/// Repetition count for a spec; negative counts produce no values.
pub fn resolve_loop_count(raw: &RawValue, resolved: &ResolvedValues) -> u64 {
    resolve_number(raw, resolved)
        .map(|number| number.as_i64().max(0) as u64)
        .unwrap_or(DEFAULT_LOOP_COUNT)
}

pub fn resolve_bound(raw: &RawValue, resolved: &ResolvedValues) -> Number {
    resolve_number(raw, resolved).unwrap_or(DEFAULT_BOUND)
}

fn resolve_length_value(raw: &RawValue, resolved: &ResolvedValues) -> i64 {
    resolve_number(raw, resolved)
        .map(Number::as_i64)
        .unwrap_or(DEFAULT_STRING_LENGTH as i64)
}

/// Draw a string length from a `string_length` field.
pub fn draw_length(
    variable: &str,
    raw: Option<&RawValue>,
    resolved: &ResolvedValues,
    rng: &mut dyn rand::RngCore,
) -> Result<usize, GenerationError> {
    let default = RawValue::Int(DEFAULT_STRING_LENGTH as i64);
    let raw = raw.unwrap_or(&default);
    let spec = LengthSpec::parse(raw)
        .map_err(|err| GenerationError::config(variable, err.to_string()))?;

    match spec {
        LengthSpec::Fixed(value) => {
            let length = resolve_length_value(&value, resolved);
            if length < 0 {
                return Err(GenerationError::config(
                    variable,
                    format!("string length must not be negative (got {length})"),
                ));
            }
            Ok(length as usize)
        }
        LengthSpec::Between(lo, hi) => {
            let min_len = resolve_length_value(&lo, resolved);
            let max_len = resolve_length_value(&hi, resolved);
            if min_len < 0 || max_len < 0 {
                return Err(GenerationError::config(
                    variable,
                    format!("string length must not be negative ({min_len},{max_len})"),
                ));
            }
            if min_len > max_len {
                return Err(GenerationError::config(
                    variable,
                    format!("minimum length {min_len} exceeds maximum length {max_len}"),
                ));
            }
            Ok(rng.random_range(min_len..=max_len) as usize)
        }
    }
}
