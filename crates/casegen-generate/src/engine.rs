use std::collections::HashSet;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use casegen_core::VariableSpec;

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, ValueContext, generate_value};
use crate::group;
use crate::model::GenerationOutcome;
use crate::resolve::ResolvedValues;
use crate::script::ScriptCache;

/// Number of groups shown by [`Generator::preview`].
pub const PREVIEW_COUNT: usize = 3;
/// Build attempts allowed per requested group when avoiding duplicates.
pub const ATTEMPTS_PER_GROUP: usize = 10;

/// Expands variable specs into data groups.
///
/// Owns the single random source used for every draw, including draws made
/// by custom code, so two generators seeded alike produce identical output.
#[derive(Debug)]
pub struct Generator {
    rng: ChaCha8Rng,
    seed: Option<u64>,
    scripts: ScriptCache,
}

impl Generator {
    /// Generator seeded from operating-system entropy.
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
            seed: None,
            scripts: ScriptCache::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
            scripts: ScriptCache::new(),
        }
    }

    /// Restart the random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.seed = Some(seed);
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Build `count` groups.
    ///
    /// With `no_duplicate`, exact repeats are discarded and retried up to
    /// `count * ATTEMPTS_PER_GROUP` builds in total; running out is reported
    /// through [`GenerationOutcome::shortfall`], not as an error. Any
    /// configuration error aborts the whole call.
    pub fn generate(
        &mut self,
        specs: &[VariableSpec],
        count: usize,
        no_duplicate: bool,
    ) -> Result<GenerationOutcome, GenerationError> {
        let start = Instant::now();
        info!(
            variables = specs.len(),
            count,
            no_duplicate,
            seed = self.seed,
            "generation started"
        );

        let max_attempts = if no_duplicate {
            count.saturating_mul(ATTEMPTS_PER_GROUP)
        } else {
            count
        };
        let mut groups = Vec::with_capacity(count);
        let mut seen: HashSet<String> = HashSet::new();
        let mut attempts = 0_usize;
        let mut duplicates_rejected = 0_usize;

        while groups.len() < count && attempts < max_attempts {
            attempts += 1;
            let group = self.build_group(specs)?;
            if no_duplicate {
                if seen.contains(&group) {
                    duplicates_rejected += 1;
                    debug!(attempt = attempts, "duplicate group rejected");
                    continue;
                }
                seen.insert(group.clone());
            }
            groups.push(group);
        }

        let outcome = GenerationOutcome {
            groups,
            requested: count,
            attempts,
            duplicates_rejected,
        };

        if let Some(shortfall) = outcome.shortfall() {
            warn!(
                requested = shortfall.requested,
                produced = shortfall.produced,
                attempts = shortfall.attempts,
                "could only generate {} unique groups, fewer than the {} requested",
                shortfall.produced,
                shortfall.requested
            );
        }
        info!(
            produced = outcome.groups.len(),
            attempts,
            duplicates_rejected,
            duration_ms = start.elapsed().as_millis() as u64,
            "generation finished"
        );

        Ok(outcome)
    }

    /// Same as [`Generator::generate`] with [`PREVIEW_COUNT`] groups.
    pub fn preview(
        &mut self,
        specs: &[VariableSpec],
        no_duplicate: bool,
    ) -> Result<GenerationOutcome, GenerationError> {
        self.generate(specs, PREVIEW_COUNT, no_duplicate)
    }

    /// Build a single data group.
    pub fn build_group(&mut self, specs: &[VariableSpec]) -> Result<String, GenerationError> {
        group::build_group(specs, &mut self.rng, &mut self.scripts)
    }

    /// Trial-generate one value of `spec` with no earlier variables in scope.
    pub fn check_spec(&mut self, spec: &VariableSpec) -> Result<GeneratedValue, GenerationError> {
        let resolved = ResolvedValues::new();
        let mut ctx = ValueContext {
            resolved: &resolved,
            scripts: &mut self.scripts,
            rng: &mut self.rng,
        };
        generate_value(spec, &mut ctx)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegen_core::{DataType, Separator};

    #[test]
    fn plain_generation_returns_exactly_count() {
        let specs = vec![VariableSpec::range("n", DataType::Integer, 1, 2)];
        let mut generator = Generator::with_seed(1);
        let outcome = generator.generate(&specs, 25, false).unwrap();
        assert_eq!(outcome.groups.len(), 25);
        assert_eq!(outcome.attempts, 25);
        assert!(outcome.is_complete());
    }

    #[test]
    fn zero_count_does_nothing() {
        let specs = vec![VariableSpec::range("n", DataType::Integer, 1, 2)];
        let outcome = Generator::with_seed(1).generate(&specs, 0, true).unwrap();
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.attempts, 0);
        assert!(outcome.shortfall().is_none());
    }

    #[test]
    fn duplicate_avoidance_reports_shortfall() {
        let specs = vec![VariableSpec::range("n", DataType::Integer, 1, 3)];
        let outcome = Generator::with_seed(9).generate(&specs, 10, true).unwrap();
        assert!(outcome.groups.len() <= 3);
        assert!(outcome.attempts <= 10 * ATTEMPTS_PER_GROUP);
        let shortfall = outcome.shortfall().expect("shortfall");
        assert_eq!(shortfall.requested, 10);
        assert_eq!(shortfall.produced, outcome.groups.len());
        assert_eq!(
            outcome.duplicates_rejected,
            outcome.attempts - outcome.groups.len()
        );
    }

    #[test]
    fn preview_uses_fixed_count() {
        let specs = vec![
            VariableSpec::char_set("c", DataType::Char, "a-z").with_separator(Separator::None),
        ];
        let outcome = Generator::with_seed(4).preview(&specs, false).unwrap();
        assert_eq!(outcome.groups.len(), PREVIEW_COUNT);
    }

    #[test]
    fn reseed_restarts_the_stream() {
        let specs = vec![VariableSpec::range("n", DataType::Integer, 1, 1_000_000)];
        let mut generator = Generator::with_seed(5);
        let first = generator.generate(&specs, 5, false).unwrap();
        generator.reseed(5);
        let second = generator.generate(&specs, 5, false).unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.seed(), Some(5));
    }

    #[test]
    fn check_spec_surfaces_configuration_errors() {
        let mut generator = Generator::with_seed(2);
        let bad = VariableSpec::char_set("c", DataType::Char, "z-a");
        assert!(generator.check_spec(&bad).unwrap_err().is_configuration());
        let good = VariableSpec::range("n", DataType::Integer, 4, 4);
        let value = generator.check_spec(&good).unwrap();
        assert!(matches!(value.as_i64(), Some(4 | 5)));
    }

    #[test]
    fn check_spec_treats_references_as_unresolved() {
        let mut generator = Generator::with_seed(2);
        let spec = VariableSpec::range("m", DataType::Integer, "n", 0);
        for _ in 0..20 {
            let value = generator.check_spec(&spec).unwrap();
            assert!(matches!(value.as_i64(), Some(0 | 1)));
        }
    }
}
