//! Test-case generation engine for casegen.
//!
//! Expands an ordered list of variable specs into data groups, with
//! forward-only variable references, separator placement and bounded
//! duplicate avoidance. Also hosts the case-file writer and the solution
//! executor boundary used to pair inputs with expected outputs.

pub mod engine;
pub mod errors;
pub mod executor;
pub mod generators;
pub mod group;
pub mod model;
pub mod output;
pub mod resolve;
pub mod script;

pub use engine::{ATTEMPTS_PER_GROUP, Generator, PREVIEW_COUNT};
pub use errors::GenerationError;
pub use executor::{CommandRunner, SolutionRunner, solve_all};
pub use generators::GeneratedValue;
pub use model::{GenerationOutcome, GenerationSummary, Shortfall};
pub use output::{OutputOptions, OutputReport, WrittenFile, write_cases};
pub use resolve::{Resolved, ResolvedValues};
