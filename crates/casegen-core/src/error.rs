use thiserror::Error;

/// Core error type shared across casegen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A string-length field does not follow `N`, `name` or `min,max`.
    #[error("invalid string length '{0}': expected 'N', a variable name, or 'min,max'")]
    InvalidLength(String),
}

/// Convenience alias for results returned by casegen crates.
pub type Result<T> = std::result::Result<T, Error>;
