//! Run bookkeeping: log sinks and the `run.json` manifest.

mod logging;
mod run;

pub use logging::init_logging;
pub use run::{RunManifest, SolutionInfo, new_run_id, write_manifest};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot write run manifest: {0}")]
    Workspace(#[from] crate::workspace::WorkspaceError),
    #[error("cannot install log subscriber: {0}")]
    Logging(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
