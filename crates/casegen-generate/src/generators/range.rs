use std::cmp::Ordering;

use casegen_core::{DataType, Number, VariableSpec};
use rand::Rng;

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, ValueContext};
use crate::resolve::{draw_length, resolve_bound};

/// Order resolved bounds so the draw range is never empty.
///
/// Equal bounds widen to `min..=min+1`; inverted bounds swap.
pub fn normalize_bounds(min: Number, max: Number) -> (Number, Number) {
    let order = match (min, max) {
        (Number::Int(lo), Number::Int(hi)) => lo.partial_cmp(&hi),
        _ => min.as_f64().partial_cmp(&max.as_f64()),
    };
    match order {
        Some(Ordering::Greater) => (max, min),
        Some(Ordering::Equal) => (min, min.plus_one()),
        _ => (min, max),
    }
}

/// Uniform draw from `lo..=hi`, halving the bounds when their span
/// overflows `f64`.
pub(crate) fn draw_float(rng: &mut dyn rand::RngCore, lo: f64, hi: f64) -> Option<f64> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return None;
    }
    if (hi - lo).is_finite() {
        Some(rng.random_range(lo..=hi))
    } else {
        Some(rng.random_range(lo / 2.0..=hi / 2.0) * 2.0)
    }
}

pub(super) fn generate(
    spec: &VariableSpec,
    ctx: &mut ValueContext<'_>,
) -> Result<GeneratedValue, GenerationError> {
    let min_raw = spec
        .min_value
        .as_ref()
        .ok_or_else(|| GenerationError::config(&spec.name, "range source requires min_value"))?;
    let max_raw = spec
        .max_value
        .as_ref()
        .ok_or_else(|| GenerationError::config(&spec.name, "range source requires max_value"))?;

    let (min, max) = normalize_bounds(
        resolve_bound(min_raw, ctx.resolved),
        resolve_bound(max_raw, ctx.resolved),
    );

    match spec.data_type {
        DataType::Integer => {
            let (lo, hi) = (min.as_i64(), max.as_i64());
            Ok(GeneratedValue::Int(ctx.rng.random_range(lo..=hi)))
        }
        DataType::Float => {
            let value = draw_float(&mut *ctx.rng, min.as_f64(), max.as_f64()).ok_or_else(|| {
                GenerationError::config(
                    &spec.name,
                    format!("float range {min}..={max} must have finite bounds"),
                )
            })?;
            Ok(GeneratedValue::Float(round_to_cents(value)))
        }
        DataType::String => {
            let (lo, hi) = (min.as_i64(), max.as_i64());
            let length = draw_length(
                &spec.name,
                spec.string_length.as_ref(),
                ctx.resolved,
                &mut *ctx.rng,
            )?;
            let mut value = String::with_capacity(length);
            for _ in 0..length {
                let code = ctx.rng.random_range(lo..=hi);
                let ch = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        GenerationError::config(
                            &spec.name,
                            format!("code point {code} is not a valid character"),
                        )
                    })?;
                value.push(ch);
            }
            Ok(GeneratedValue::Text(value))
        }
        DataType::Char => Err(GenerationError::config(
            &spec.name,
            "range source does not support char values; use a charset",
        )),
    }
}

// Magnitudes too large to scale are already whole numbers.
fn round_to_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}
