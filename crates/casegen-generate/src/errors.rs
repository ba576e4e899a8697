use thiserror::Error;

/// Errors emitted by the generation engine and its collaborators.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The variable spec is inconsistent or unsatisfiable at generation time.
    #[error("variable '{variable}': {message}")]
    Configuration { variable: String, message: String },
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("output error: {0}")]
    Output(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    pub fn config(variable: &str, message: impl Into<String>) -> Self {
        GenerationError::Configuration {
            variable: variable.to_string(),
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerationError::Configuration { .. })
    }
}
