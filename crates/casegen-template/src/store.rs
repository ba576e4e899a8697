//! Directory-backed template store with built-in defaults.
//!
//! User templates live as `<safe name>.json` files in one directory. Built-in
//! templates are compiled into the binary, are looked up first and can never
//! be overwritten or deleted.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{Result, TemplateError};
use crate::model::Template;
use crate::schema::template_json_schema_value;
use crate::validate::{
    ValidatedTemplate, normalize_labels, validate_template, validate_template_semantics,
};

const DEFAULT_TEMPLATES: &str = include_str!("../templates/defaults.json");

/// Maximum length, in characters, of a template file stem.
pub const MAX_FILE_STEM_LEN: usize = 50;

const TEMPLATE_EXTENSION: &str = "json";

/// Where a listed template comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOrigin {
    BuiltIn,
    User,
}

impl TemplateOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateOrigin::BuiltIn => "built-in",
            TemplateOrigin::User => "user",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub origin: TemplateOrigin,
    pub template: Template,
    /// Backing file for user templates.
    pub path: Option<PathBuf>,
}

/// File stem for a template name: reserved characters and whitespace runs
/// become `_`, and the result is cut to [`MAX_FILE_STEM_LEN`] characters.
pub fn safe_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ch.is_control() {
            out.push('_');
        } else {
            out.push(ch);
        }
    }

    let stem: String = out.chars().take(MAX_FILE_STEM_LEN).collect();
    if stem.is_empty() {
        "template".to_string()
    } else {
        stem
    }
}

/// Read a template document from disk, accepting legacy labels.
pub fn read_template_file(path: &Path) -> Result<Template> {
    let mut json = read_json(path)?;
    normalize_labels(&mut json);
    Ok(serde_json::from_value(json)?)
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
    builtins: Vec<Template>,
}

impl TemplateStore {
    /// Open the store rooted at `dir`. The directory is created on first save.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let builtins: Vec<Template> = serde_json::from_str(DEFAULT_TEMPLATES)?;
        Ok(Self {
            dir: dir.into(),
            builtins,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn builtins(&self) -> &[Template] {
        &self.builtins
    }

    fn builtin(&self, name: &str) -> Option<&Template> {
        self.builtins.iter().find(|template| template.name == name)
    }

    /// Path a user template with this name is saved under.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{TEMPLATE_EXTENSION}", safe_file_name(name)))
    }

    /// Built-in templates followed by user templates sorted by file name.
    ///
    /// Unreadable user files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<TemplateEntry>> {
        let mut entries: Vec<TemplateEntry> = self
            .builtins
            .iter()
            .map(|template| TemplateEntry {
                origin: TemplateOrigin::BuiltIn,
                template: template.clone(),
                path: None,
            })
            .collect();

        for path in self.user_files()? {
            match read_template_file(&path) {
                Ok(template) => entries.push(TemplateEntry {
                    origin: TemplateOrigin::User,
                    template,
                    path: Some(path),
                }),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable template");
                }
            }
        }

        Ok(entries)
    }

    fn user_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_template = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == TEMPLATE_EXTENSION);
            if is_template {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Find a user template by name: its safe-name file first, then a scan.
    fn find_user(&self, name: &str) -> Result<Option<(PathBuf, Template)>> {
        let direct = self.path_for(name);
        if direct.is_file() {
            let template = read_template_file(&direct)?;
            if template.name == name {
                return Ok(Some((direct, template)));
            }
        }

        for path in self.user_files()? {
            if path == direct {
                continue;
            }
            match read_template_file(&path) {
                Ok(template) if template.name == name => return Ok(Some((path, template))),
                Ok(_) => {}
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "ignoring unreadable template");
                }
            }
        }
        Ok(None)
    }

    /// Look a template up by name, built-in templates first.
    pub fn load(&self, name: &str) -> Result<Template> {
        if let Some(template) = self.builtin(name) {
            return Ok(template.clone());
        }
        self.find_user(name)?
            .map(|(_, template)| template)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Validate, stamp `created_time`, and write the template atomically.
    /// An existing user template with the same name is replaced.
    pub fn save(&self, template: &Template) -> Result<PathBuf> {
        if self.builtin(&template.name).is_some() {
            return Err(TemplateError::BuiltIn(template.name.clone()));
        }
        let report = validate_template_semantics(template);
        if !report.is_ok() {
            return Err(TemplateError::Invalid {
                name: template.name.clone(),
                report,
            });
        }

        let mut stamped = template.clone();
        stamped.created_time = Some(Local::now().to_rfc3339_opts(SecondsFormat::Secs, false));

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&stamped.name);
        // Distinct names can share a sanitized file name.
        if path.is_file()
            && let Ok(existing) = read_template_file(&path)
            && existing.name != stamped.name
        {
            return Err(TemplateError::FileNameTaken {
                name: stamped.name,
                existing: existing.name,
                path,
            });
        }
        let data = serde_json::to_vec_pretty(&stamped)?;
        write_atomic(&path, &data)?;

        info!(
            template = %stamped.name,
            path = %path.display(),
            variables = stamped.variables.len(),
            "template saved"
        );
        Ok(path)
    }

    /// Remove a user template. Returns false when no such template exists.
    pub fn delete(&self, name: &str) -> Result<bool> {
        if self.builtin(name).is_some() {
            return Err(TemplateError::BuiltIn(name.to_string()));
        }
        match self.find_user(name)? {
            Some((path, _)) => {
                fs::remove_file(&path)?;
                info!(template = %name, path = %path.display(), "template deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Validate a template file and save it as a user template.
    pub fn import(&self, path: &Path, strict: bool) -> Result<(PathBuf, ValidatedTemplate)> {
        let json = read_json(path)?;
        let schema = template_json_schema_value()?;
        let validated = match validate_template(&json, &schema, strict) {
            Ok(validated) => validated,
            Err(report) => {
                let name = json
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(TemplateError::Invalid { name, report });
            }
        };
        let saved = self.save(&validated.template)?;
        info!(source = %path.display(), "template imported");
        Ok((saved, validated))
    }

    /// Write a template, built-in or user, to `path` as pretty JSON.
    pub fn export(&self, name: &str, path: &Path) -> Result<()> {
        let template = self.load(name)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&template)?;
        write_atomic(path, &data)?;
        info!(template = %name, path = %path.display(), "template exported");
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' does not name a file", path.display()),
            )
        })?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
