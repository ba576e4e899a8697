use casegen_core::{DataType, RawValue, VariableSpec};
use rand::Rng;

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, ValueContext};

pub(super) fn generate(
    spec: &VariableSpec,
    ctx: &mut ValueContext<'_>,
) -> Result<GeneratedValue, GenerationError> {
    if spec.choices.is_empty() {
        return Err(GenerationError::config(
            &spec.name,
            "choice list must not be empty",
        ));
    }

    let idx = ctx.rng.random_range(0..spec.choices.len());
    coerce_choice(spec, &spec.choices[idx])
}

fn coerce_choice(spec: &VariableSpec, selected: &RawValue) -> Result<GeneratedValue, GenerationError> {
    match spec.data_type {
        DataType::Integer => match selected {
            RawValue::Int(value) => Ok(GeneratedValue::Int(*value)),
            RawValue::Float(value) => Ok(GeneratedValue::Int(value.trunc() as i64)),
            RawValue::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(GeneratedValue::Int)
                .map_err(|_| {
                    GenerationError::config(
                        &spec.name,
                        format!("choice '{text}' is not an integer"),
                    )
                }),
        },
        DataType::Float => selected
            .literal_number()
            .map(|number| GeneratedValue::Float(number.as_f64()))
            .ok_or_else(|| {
                GenerationError::config(&spec.name, format!("choice '{selected}' is not a number"))
            }),
        DataType::String | DataType::Char => Ok(GeneratedValue::Text(selected.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_choices_parse_text() {
        let spec = VariableSpec::choice_list("n", DataType::Integer, [" 12 "]);
        assert_eq!(
            coerce_choice(&spec, &spec.choices[0]).unwrap(),
            GeneratedValue::Int(12)
        );
    }

    #[test]
    fn non_numeric_choice_is_a_configuration_error() {
        let spec = VariableSpec::choice_list("n", DataType::Float, ["abc"]);
        let err = coerce_choice(&spec, &spec.choices[0]).unwrap_err();
        assert!(err.to_string().contains("variable 'n'"));
    }

    #[test]
    fn string_choices_render_literals() {
        let spec = VariableSpec::choice_list("s", DataType::String, [RawValue::Float(2.0)]);
        assert_eq!(
            coerce_choice(&spec, &spec.choices[0]).unwrap(),
            GeneratedValue::Text("2.0".to_string())
        );
    }
}
