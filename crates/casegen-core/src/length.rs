use crate::error::{Error, Result};
use crate::value::RawValue;

/// Parsed form of a `string_length` field.
#[derive(Debug, Clone, PartialEq)]
pub enum LengthSpec {
    /// Fixed length: a literal or a variable reference.
    Fixed(RawValue),
    /// Random length drawn from `lo..=hi`, each side resolved independently.
    Between(RawValue, RawValue),
}

impl LengthSpec {
    pub fn parse(raw: &RawValue) -> Result<Self> {
        let text = match raw {
            RawValue::Text(text) => text.trim(),
            other => return Ok(LengthSpec::Fixed(other.clone())),
        };

        if !text.contains(',') {
            if text.is_empty() {
                return Err(Error::InvalidLength(text.to_string()));
            }
            return Ok(LengthSpec::Fixed(RawValue::text(text)));
        }

        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [lo, hi] if !lo.is_empty() && !hi.is_empty() => Ok(LengthSpec::Between(
                RawValue::text(*lo),
                RawValue::text(*hi),
            )),
            _ => Err(Error::InvalidLength(text.to_string())),
        }
    }

    /// Variable names referenced by either side.
    pub fn references(&self) -> Vec<&str> {
        match self {
            LengthSpec::Fixed(value) => value.reference().into_iter().collect(),
            LengthSpec::Between(lo, hi) => lo.reference().into_iter().chain(hi.reference()).collect(),
        }
    }
}
