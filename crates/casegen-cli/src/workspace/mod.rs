//! On-disk state owned by the CLI: settings and atomically written files.

mod atomic;
mod settings;

pub use atomic::write_json_atomic;
pub use settings::{DEFAULT_CONFIG_FILE, load_or_create_settings};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("cannot access workspace file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed settings: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("cannot encode settings: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("'{0}' does not name a file")]
    InvalidPath(String),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
