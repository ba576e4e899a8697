use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};

use casegen_generate::{GenerationError, OutputOptions, write_cases};

fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn inputs() -> Vec<String> {
    vec!["3\n1 2 3".to_string(), "1\n9\n".to_string()]
}

#[test]
fn writes_numbered_inputs_with_trailing_newline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = OutputOptions::new(dir.path(), "test");
    let report = write_cases(&inputs(), None, &options).expect("write");

    let names: Vec<&str> = report.files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, vec!["test01.in", "test02.in"]);
    assert_eq!(
        fs::read_to_string(dir.path().join("test01.in")).expect("read"),
        "3\n1 2 3\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("test02.in")).expect("read"),
        "1\n9\n"
    );
    assert_eq!(report.case_count(), 2);
    assert!(report.archive.is_none());
}

#[test]
fn pairs_outputs_and_reports_checksums() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = OutputOptions::new(dir.path(), "");
    let solutions = vec!["6".to_string(), "9".to_string()];
    let report = write_cases(&inputs(), Some(&solutions), &options).expect("write");

    let names: Vec<&str> = report.files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, vec!["01.in", "01.out", "02.in", "02.out"]);
    for file in &report.files {
        assert_eq!(file.sha256, hash_file(&file.path).expect("hash"));
        assert_eq!(file.bytes, fs::metadata(&file.path).expect("meta").len());
    }
    assert_eq!(
        fs::read_to_string(dir.path().join("02.out")).expect("read"),
        "9\n"
    );
}

#[test]
fn mismatched_solution_count_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = OutputOptions::new(dir.path(), "t");
    let solutions = vec!["only one".to_string()];
    let err = write_cases(&inputs(), Some(&solutions), &options).unwrap_err();
    assert!(matches!(err, GenerationError::Output(_)));
    assert!(!dir.path().join("t01.in").exists());
}

#[test]
fn archive_contains_files_by_bare_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = OutputOptions::new(dir.path(), "case").with_archive(true);
    let solutions = vec!["6".to_string(), "9".to_string()];
    let report = write_cases(&inputs(), Some(&solutions), &options).expect("write");

    let archive = report.archive.as_ref().expect("archive");
    assert!(archive.name.starts_with("case_data_"));
    assert!(archive.name.ends_with(".tar.gz"));
    assert_eq!(archive.sha256, hash_file(&archive.path).expect("hash"));
    assert!(report.loose_files_deleted);
    for file in &report.files {
        assert!(!file.path.exists(), "{} should be deleted", file.name);
    }

    let mut tar = tar::Archive::new(GzDecoder::new(File::open(&archive.path).expect("open")));
    let mut entries: Vec<(String, String)> = tar
        .entries()
        .expect("entries")
        .map(|entry| {
            let mut entry = entry.expect("entry");
            let name = entry.path().expect("path").to_string_lossy().into_owned();
            let mut contents = String::new();
            entry.read_to_string(&mut contents).expect("contents");
            (name, contents)
        })
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("case01.in".to_string(), "3\n1 2 3\n".to_string()),
            ("case01.out".to_string(), "6\n".to_string()),
            ("case02.in".to_string(), "1\n9\n".to_string()),
            ("case02.out".to_string(), "9\n".to_string()),
        ]
    );
}

#[test]
fn archive_keeps_loose_files_unless_asked() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = OutputOptions::new(dir.path(), "keep").with_archive(false);
    let report = write_cases(&inputs(), None, &options).expect("write");
    assert!(report.archive.is_some());
    assert!(!report.loose_files_deleted);
    assert!(dir.path().join("keep01.in").exists());
}
