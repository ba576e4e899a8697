use std::path::{Path, PathBuf};

use casegen_generate::{GenerationSummary, OutputReport, WrittenFile};
use serde::{Deserialize, Serialize};

use super::RegistryResult;
use crate::workspace::write_json_atomic;

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MANIFEST_FILE: &str = "run.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Ok,
    /// Fewer unique groups than requested were produced.
    Partial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionInfo {
    pub command: Vec<String>,
    pub timeout_ms: u64,
}

/// Record of one `generate` invocation, written next to the case files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub status: RunStatus,
    pub template: String,
    pub seed: u64,
    pub no_duplicate: bool,
    pub summary: GenerationSummary,
    pub output_dir: PathBuf,
    pub files: Vec<WrittenFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<WrittenFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionInfo>,
    pub cli_version: String,
    pub created_at: String,
    pub finished_at: String,
}

impl RunManifest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_id: String,
        template: String,
        seed: u64,
        no_duplicate: bool,
        summary: GenerationSummary,
        output_dir: PathBuf,
        report: OutputReport,
        solution: Option<SolutionInfo>,
        created_at: String,
    ) -> Self {
        let status = if summary.shortfall.is_some() {
            RunStatus::Partial
        } else {
            RunStatus::Ok
        };
        let files = if report.loose_files_deleted {
            Vec::new()
        } else {
            report.files
        };
        Self {
            run_id,
            status,
            template,
            seed,
            no_duplicate,
            summary,
            output_dir,
            files,
            archive: report.archive,
            solution,
            cli_version: CLI_VERSION.to_string(),
            created_at,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub fn new_run_id() -> String {
    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let id = uuid::Uuid::new_v4().simple().to_string();
    let short = id.get(..8).unwrap_or(&id);
    format!("{date}__run_{short}")
}

pub fn write_manifest(dir: &Path, manifest: &RunManifest) -> RegistryResult<PathBuf> {
    let path = dir.join(MANIFEST_FILE);
    write_json_atomic(&path, manifest)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(requested: usize, produced: usize) -> GenerationSummary {
        GenerationSummary {
            requested,
            produced,
            attempts: requested * 10,
            duplicates_rejected: 0,
            shortfall: (produced < requested).then_some(casegen_generate::Shortfall {
                requested,
                produced,
                attempts: requested * 10,
            }),
        }
    }

    #[test]
    fn run_ids_are_dated_and_short() {
        let id = new_run_id();
        let (date, rest) = id.split_once("__run_").expect("separator");
        assert_eq!(date.len(), 10);
        assert_eq!(rest.len(), 8);
        assert_ne!(id, new_run_id());
    }

    #[test]
    fn shortfall_marks_manifest_partial() {
        let manifest = RunManifest::new(
            new_run_id(),
            "t".to_string(),
            7,
            true,
            summary(5, 3),
            PathBuf::from("out"),
            OutputReport::default(),
            None,
            chrono::Utc::now().to_rfc3339(),
        );
        assert_eq!(manifest.status, RunStatus::Partial);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(dir.path(), &manifest).expect("write");
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("parse");
        assert_eq!(value["status"], "PARTIAL");
        assert_eq!(value["summary"]["shortfall"]["produced"], 3);
        assert!(value.get("archive").is_none());
    }
}
