use casegen_core::{DataType, Number, VariableSpec};

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, ValueContext};
use crate::script::Value;

pub(super) fn generate(
    spec: &VariableSpec,
    ctx: &mut ValueContext<'_>,
) -> Result<GeneratedValue, GenerationError> {
    let code = spec
        .custom_code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| {
            GenerationError::config(&spec.name, "custom code source requires custom_code")
        })?;

    let script = ctx
        .scripts
        .get_or_compile(code)
        .map_err(|err| GenerationError::config(&spec.name, format!("custom code: {err}")))?;
    let value = script
        .run(&mut *ctx.rng)
        .map_err(|err| GenerationError::config(&spec.name, format!("custom code: {err}")))?;

    coerce(spec, value)
}

fn coerce(spec: &VariableSpec, value: Value) -> Result<GeneratedValue, GenerationError> {
    let mismatch = |target: &str, value: &Value| {
        GenerationError::config(
            &spec.name,
            format!("custom code returned '{value}', which is not a valid {target}"),
        )
    };

    match spec.data_type {
        DataType::Integer => match &value {
            Value::Int(v) => Ok(GeneratedValue::Int(*v)),
            Value::Float(v) if v.is_finite() => Ok(GeneratedValue::Int(v.trunc() as i64)),
            Value::Bool(v) => Ok(GeneratedValue::Int(i64::from(*v))),
            Value::Str(text) => text
                .trim()
                .parse::<i64>()
                .map(GeneratedValue::Int)
                .map_err(|_| mismatch("integer", &value)),
            _ => Err(mismatch("integer", &value)),
        },
        DataType::Float => match &value {
            Value::Int(v) => Ok(GeneratedValue::Float(*v as f64)),
            Value::Float(v) => Ok(GeneratedValue::Float(*v)),
            Value::Bool(v) => Ok(GeneratedValue::Float(if *v { 1.0 } else { 0.0 })),
            Value::Str(text) => Number::parse(text)
                .map(|number| GeneratedValue::Float(number.as_f64()))
                .ok_or_else(|| mismatch("float", &value)),
            _ => Err(mismatch("float", &value)),
        },
        DataType::String | DataType::Char => Ok(GeneratedValue::Text(value.to_string())),
    }
}
