use std::fmt;

use casegen_core::{Number, SourceType, VariableSpec, format_float};

use crate::errors::GenerationError;
use crate::resolve::ResolvedValues;
use crate::script::ScriptCache;

mod charset;
mod choice;
mod custom;
mod range;

pub use range::normalize_bounds;
pub(crate) use range::draw_float;

/// Value produced for one repetition of a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl GeneratedValue {
    /// Numeric reading used when a later variable references this one.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            GeneratedValue::Int(value) => Some(Number::Int(*value)),
            GeneratedValue::Float(value) => Some(Number::Float(*value)),
            GeneratedValue::Text(value) => Number::parse_digits(value),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for GeneratedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedValue::Int(value) => write!(f, "{value}"),
            GeneratedValue::Float(value) => f.write_str(&format_float(*value)),
            GeneratedValue::Text(value) => f.write_str(value),
        }
    }
}

/// Per-value state handed to each source strategy.
pub struct ValueContext<'a> {
    /// Values of the variables already generated in this group.
    pub resolved: &'a ResolvedValues,
    pub scripts: &'a mut ScriptCache,
    pub rng: &'a mut dyn rand::RngCore,
}

/// Produce one value of `spec` for one repetition.
pub fn generate_value(
    spec: &VariableSpec,
    ctx: &mut ValueContext<'_>,
) -> Result<GeneratedValue, GenerationError> {
    match spec.source_type {
        SourceType::Range => range::generate(spec, ctx),
        SourceType::ChoiceList => choice::generate(spec, ctx),
        SourceType::CharSet => charset::generate(spec, ctx),
        SourceType::CustomCode => custom::generate(spec, ctx),
    }
}
