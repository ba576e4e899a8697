//! Case-file persistence: numbered `.in`/`.out` files plus an optional
//! tarball of the run.

mod archive;
mod files;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::GenerationError;

pub use archive::{archive_name, write_archive};
pub use files::{case_file_name, sha256_hex, write_case_file};

pub const INPUT_EXTENSION: &str = "in";
pub const OUTPUT_EXTENSION: &str = "out";

/// Where and how case files are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputOptions {
    pub dir: PathBuf,
    /// File name prefix; may be empty.
    pub prefix: String,
    /// Bundle the written files into `{prefix}_data_{timestamp}.tar.gz`.
    pub archive: bool,
    /// Remove the loose files once they are archived.
    pub delete_loose_files: bool,
}

impl OutputOptions {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            archive: false,
            delete_loose_files: false,
        }
    }

    pub fn with_archive(mut self, delete_loose_files: bool) -> Self {
        self.archive = true;
        self.delete_loose_files = delete_loose_files;
        self
    }
}

/// A file produced by [`write_cases`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub name: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputReport {
    /// Case files in write order (`.in` before `.out` for each case).
    pub files: Vec<WrittenFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<WrittenFile>,
    /// Loose files were removed after archiving.
    pub loose_files_deleted: bool,
}

impl OutputReport {
    pub fn case_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| file.name.ends_with(&format!(".{INPUT_EXTENSION}")))
            .count()
    }
}

/// Write every input (and its expected output, when given) as numbered
/// case files.
pub fn write_cases(
    inputs: &[String],
    solutions: Option<&[String]>,
    options: &OutputOptions,
) -> Result<OutputReport, GenerationError> {
    if let Some(solutions) = solutions
        && solutions.len() != inputs.len()
    {
        return Err(GenerationError::Output(format!(
            "{} inputs but {} expected outputs",
            inputs.len(),
            solutions.len()
        )));
    }

    std::fs::create_dir_all(&options.dir)?;
    let mut report = OutputReport::default();

    for (idx, input) in inputs.iter().enumerate() {
        let number = idx + 1;
        let name = case_file_name(&options.prefix, number, INPUT_EXTENSION);
        report.files.push(write_case_file(&options.dir, &name, input)?);

        if let Some(solutions) = solutions {
            let name = case_file_name(&options.prefix, number, OUTPUT_EXTENSION);
            report
                .files
                .push(write_case_file(&options.dir, &name, &solutions[idx])?);
        }
        debug!(case = number, "case files written");
    }

    if options.archive && !report.files.is_empty() {
        let timestamp = chrono::Local::now().naive_local();
        let path = options.dir.join(archive_name(&options.prefix, timestamp));
        let archive = write_archive(&path, &report.files)?;
        info!(
            archive = %archive.path.display(),
            files = report.files.len(),
            bytes = archive.bytes,
            "case archive written"
        );
        report.archive = Some(archive);

        if options.delete_loose_files {
            remove_files(report.files.iter().map(|file| file.path.as_path()))?;
            report.loose_files_deleted = true;
        }
    }

    info!(
        dir = %options.dir.display(),
        cases = inputs.len(),
        files = report.files.len(),
        "case files written"
    );
    Ok(report)
}

fn remove_files<'a>(paths: impl Iterator<Item = &'a Path>) -> std::io::Result<()> {
    for path in paths {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
