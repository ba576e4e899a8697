use schemars::schema::RootSchema;
use schemars::schema_for;
use serde_json::Value;

use crate::errors::Result;
use crate::model::Template;

/// JSON Schema for template documents.
pub fn template_json_schema() -> RootSchema {
    schema_for!(Template)
}

/// Template schema as a JSON value, ready for structural validation.
pub fn template_json_schema_value() -> Result<Value> {
    Ok(serde_json::to_value(template_json_schema())?)
}
