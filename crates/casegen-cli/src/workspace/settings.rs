use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::WorkspaceResult;
use super::atomic::write_bytes_atomic;

pub const DEFAULT_CONFIG_FILE: &str = "casegen.toml";

/// Persistent defaults; every field can be overridden per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory that receives case files, `run.json` and logs.
    pub output_dir: PathBuf,
    pub file_prefix: String,
    /// Bundle the case files into a `.tar.gz` archive.
    pub archive: bool,
    /// Remove loose case files once archived.
    pub delete_temp_files: bool,
    pub templates_dir: PathBuf,
    pub default_count: usize,
    pub no_duplicate: bool,
    pub solution_timeout_ms: u64,
    /// Append JSON log lines to `logs.ndjson` in the output directory.
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("testdata"),
            file_prefix: String::new(),
            archive: false,
            delete_temp_files: true,
            templates_dir: PathBuf::from("templates"),
            default_count: 10,
            no_duplicate: false,
            solution_timeout_ms: 10_000,
            json_logs: true,
        }
    }
}

impl Settings {
    pub fn solution_timeout(&self) -> Duration {
        Duration::from_millis(self.solution_timeout_ms)
    }
}

pub fn load_or_create_settings(path: &Path) -> WorkspaceResult<Settings> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        return Ok(settings);
    }

    let settings = Settings::default();
    save_settings(path, &settings)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> WorkspaceResult<()> {
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let settings = load_or_create_settings(&path).expect("create");
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        let reloaded = load_or_create_settings(&path).expect("reload");
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "file_prefix = \"t\"\narchive = true\n").expect("write");

        let settings = load_or_create_settings(&path).expect("load");
        assert_eq!(settings.file_prefix, "t");
        assert!(settings.archive);
        assert_eq!(settings.default_count, 10);
        assert_eq!(settings.solution_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "default_count = \"many\"").expect("write");
        assert!(load_or_create_settings(&path).is_err());
    }
}
