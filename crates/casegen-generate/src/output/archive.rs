use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use flate2::Compression;
use flate2::write::GzEncoder;
use tar::Builder as TarBuilder;

use super::WrittenFile;
use super::files::sha256_hex;

/// `{prefix}_data_{YYYYmmdd_HHMMSS}.tar.gz`
pub fn archive_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{prefix}_data_{}.tar.gz", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Pack `files` into a gzip-compressed tarball, storing each by bare name.
pub fn write_archive(path: &Path, files: &[WrittenFile]) -> std::io::Result<WrittenFile> {
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = TarBuilder::new(encoder);
    for entry in files {
        tar.append_path_with_name(&entry.path, &entry.name)?;
    }
    let encoder = tar.into_inner()?;
    let file = encoder.finish()?;
    file.sync_all()?;

    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(WrittenFile {
        name,
        path: path.to_path_buf(),
        bytes: bytes.len() as u64,
        sha256: sha256_hex(&bytes),
    })
}
