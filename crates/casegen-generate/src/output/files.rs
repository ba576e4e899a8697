use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::WrittenFile;

/// `{prefix}{NN}.{extension}` with two-digit, 1-based numbering.
pub fn case_file_name(prefix: &str, number: usize, extension: &str) -> String {
    format!("{prefix}{number:02}.{extension}")
}

/// Write one case file, appending a newline when the content lacks one.
pub fn write_case_file(dir: &Path, name: &str, content: &str) -> std::io::Result<WrittenFile> {
    let path = dir.join(name);
    let mut bytes = content.as_bytes().to_vec();
    if !content.ends_with('\n') {
        bytes.push(b'\n');
    }

    let mut writer = BufWriter::new(File::create(&path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;

    Ok(WrittenFile {
        name: name.to_string(),
        path,
        bytes: bytes.len() as u64,
        sha256: sha256_hex(&bytes),
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_zero_padded() {
        assert_eq!(case_file_name("test", 1, "in"), "test01.in");
        assert_eq!(case_file_name("", 12, "out"), "12.out");
        assert_eq!(case_file_name("t", 100, "in"), "t100.in");
    }

    #[test]
    fn digest_matches_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
