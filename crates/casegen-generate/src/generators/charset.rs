use casegen_core::{DataType, VariableSpec, expand_charset};
use rand::Rng;

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, ValueContext};
use crate::resolve::draw_length;

pub(super) fn generate(
    spec: &VariableSpec,
    ctx: &mut ValueContext<'_>,
) -> Result<GeneratedValue, GenerationError> {
    let definition = spec.charset.as_deref().unwrap_or("");
    let chars = expand_charset(definition);
    if chars.is_empty() {
        return Err(GenerationError::config(
            &spec.name,
            format!("charset '{definition}' expands to no characters"),
        ));
    }

    match spec.data_type {
        DataType::Char => {
            let idx = ctx.rng.random_range(0..chars.len());
            Ok(GeneratedValue::Text(chars[idx].to_string()))
        }
        DataType::String => {
            let length = draw_length(
                &spec.name,
                spec.string_length.as_ref(),
                ctx.resolved,
                &mut *ctx.rng,
            )?;
            let mut value = String::with_capacity(length);
            for _ in 0..length {
                let idx = ctx.rng.random_range(0..chars.len());
                value.push(chars[idx]);
            }
            Ok(GeneratedValue::Text(value))
        }
        DataType::Integer | DataType::Float => Err(GenerationError::config(
            &spec.name,
            format!(
                "charset source does not support {} values",
                spec.data_type.as_str()
            ),
        )),
    }
}
