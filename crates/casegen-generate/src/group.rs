//! Assembly of one data group from an ordered spec list.

use casegen_core::VariableSpec;

use crate::errors::GenerationError;
use crate::generators::{ValueContext, generate_value};
use crate::resolve::{ResolvedValues, resolve_loop_count};
use crate::script::ScriptCache;

/// Build one data group.
///
/// Specs with a blank name take no part in the group. Every value is
/// followed by its spec's separator except the final value of the final
/// named spec. Each spec's values are recorded under its trimmed name
/// before the next spec runs, so only earlier variables can be referenced.
pub fn build_group(
    specs: &[VariableSpec],
    rng: &mut dyn rand::RngCore,
    scripts: &mut ScriptCache,
) -> Result<String, GenerationError> {
    let mut resolved = ResolvedValues::new();
    let mut group = String::new();
    let named: Vec<&VariableSpec> = specs
        .iter()
        .filter(|spec| !spec.name.trim().is_empty())
        .collect();
    let last_spec = named.len().saturating_sub(1);

    for (spec_idx, spec) in named.into_iter().enumerate() {
        let loop_count = resolve_loop_count(&spec.loop_count, &resolved);
        let separator = spec.separator.literal();

        let mut values = Vec::new();
        for repetition in 0..loop_count {
            let value = {
                let mut ctx = ValueContext {
                    resolved: &resolved,
                    scripts: &mut *scripts,
                    rng: &mut *rng,
                };
                generate_value(spec, &mut ctx)?
            };
            group.push_str(&value.to_string());

            let very_last = spec_idx == last_spec && repetition + 1 == loop_count;
            if !very_last {
                group.push_str(separator);
            }
            values.push(value);
        }

        resolved.insert(spec.name.trim(), values);
    }

    Ok(group)
}
