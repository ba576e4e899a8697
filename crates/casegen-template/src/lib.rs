//! Template documents for casegen: model, JSON Schema, validation and the
//! on-disk template store.

pub mod errors;
pub mod model;
pub mod schema;
pub mod store;
pub mod validate;

pub use errors::{IssueSeverity, Result, TemplateError, ValidationIssue, ValidationReport};
pub use model::Template;
pub use schema::{template_json_schema, template_json_schema_value};
pub use store::{
    MAX_FILE_STEM_LEN, TemplateEntry, TemplateOrigin, TemplateStore, read_template_file,
    safe_file_name,
};
pub use validate::{
    ValidatedTemplate, normalize_labels, validate_template, validate_template_json,
    validate_template_semantics,
};
