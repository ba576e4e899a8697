//! Core contracts and helpers for casegen.
//!
//! This crate defines the variable specification types consumed by the
//! generation engine, the charset shorthand expander, and the literal
//! parsing helpers shared by the template validator and the engine.

pub mod charset;
pub mod error;
pub mod length;
pub mod spec;
pub mod value;

pub use charset::{expand_charset, expand_charset_string};
pub use error::{Error, Result};
pub use length::LengthSpec;
pub use spec::{DataType, Separator, SourceType, VariableSpec};
pub use value::{Number, RawValue, format_float};

/// Current contract version for template documents.
pub const TEMPLATE_VERSION: &str = "0.1";

/// Loop count applied when a loop-count reference cannot be resolved.
pub const DEFAULT_LOOP_COUNT: u64 = 1;

/// String length applied when a length reference cannot be resolved.
pub const DEFAULT_STRING_LENGTH: u64 = 10;
