use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{WorkspaceError, WorkspaceResult};

/// Pretty JSON with a trailing newline, written atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> WorkspaceResult<()> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    write_bytes_atomic(path, &data)
}

/// Write `data` to a sibling temp file, fsync it, then rename it over `path`.
/// The temp file is removed if any step fails.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> WorkspaceResult<()> {
    let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir)?;
    }

    let staged = staging_path(path)?;
    let result = stage_and_swap(&staged, path, data);
    if result.is_err() {
        let _ = fs::remove_file(&staged);
    }
    result?;

    if let Some(dir) = dir {
        sync_dir(dir);
    }
    Ok(())
}

fn stage_and_swap(staged: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(staged)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(staged, target)
}

fn staging_path(path: &Path) -> WorkspaceResult<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| WorkspaceError::InvalidPath(path.display().to_string()))?;
    Ok(path.with_file_name(format!(
        ".{}.{}.tmp",
        name.to_string_lossy(),
        std::process::id()
    )))
}

// Best effort: not every platform lets a directory be opened for syncing.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}
