use casegen_core::{TEMPLATE_VERSION, VariableSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_version() -> String {
    TEMPLATE_VERSION.to_string()
}

/// A named, reusable list of variable rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Template {
    /// Template contract version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Display name, unique within a store.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Local timestamp stamped when the template is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    /// Variable rules in generation order.
    pub variables: Vec<VariableSpec>,
    /// Suggested number of data groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Suggested duplicate-avoidance setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_duplicate: Option<bool>,
}

impl Template {
    pub fn new(name: impl Into<String>, variables: Vec<VariableSpec>) -> Self {
        Self {
            version: default_version(),
            name: name.into(),
            description: String::new(),
            created_time: None,
            variables,
            count: None,
            no_duplicate: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_no_duplicate(mut self, no_duplicate: bool) -> Self {
        self.no_duplicate = Some(no_duplicate);
        self
    }

    /// Multi-line listing of every variable, one description per line.
    pub fn describe(&self) -> String {
        self.variables
            .iter()
            .enumerate()
            .map(|(idx, spec)| format!("{}. {}", idx + 1, spec.describe()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
