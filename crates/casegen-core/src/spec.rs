use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::RawValue;

/// Declared type of a generated value.
///
/// Aliases accept the labels used by templates saved from the desktop tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[serde(alias = "整数")]
    Integer,
    #[serde(alias = "浮点数")]
    Float,
    #[serde(alias = "字符串")]
    String,
    #[serde(alias = "字符")]
    Char,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Char => "char",
        }
    }
}

/// Generation strategy for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[serde(alias = "数据范围")]
    Range,
    #[serde(alias = "选择列表")]
    ChoiceList,
    #[serde(alias = "字符集合")]
    CharSet,
    #[serde(alias = "来自代码")]
    CustomCode,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Range => "range",
            SourceType::ChoiceList => "choice_list",
            SourceType::CharSet => "char_set",
            SourceType::CustomCode => "custom_code",
        }
    }
}

/// Separator emitted after each generated value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    #[serde(alias = "无")]
    None,
    #[serde(alias = "换行")]
    Newline,
    #[default]
    #[serde(alias = "空格")]
    Space,
    #[serde(alias = "制表符")]
    Tab,
    #[serde(alias = "逗号")]
    Comma,
    #[serde(alias = "分号")]
    Semicolon,
}

impl Separator {
    /// Literal text inserted into the data group.
    pub fn literal(self) -> &'static str {
        match self {
            Separator::None => "",
            Separator::Newline => "\n",
            Separator::Space => " ",
            Separator::Tab => "\t",
            Separator::Comma => ",",
            Separator::Semicolon => ";",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Separator::None => "none",
            Separator::Newline => "newline",
            Separator::Space => "space",
            Separator::Tab => "tab",
            Separator::Comma => "comma",
            Separator::Semicolon => "semicolon",
        }
    }
}

fn default_loop_count() -> RawValue {
    RawValue::Int(1)
}

fn is_default_loop_count(value: &RawValue) -> bool {
    *value == RawValue::Int(1)
}

/// One variable's generation rule.
///
/// Loop counts, range bounds and string lengths may name an earlier variable
/// in the same list instead of carrying a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariableSpec {
    /// Identifier used by later variables to reference this one.
    pub name: String,
    pub data_type: DataType,
    pub source_type: SourceType,
    #[serde(default)]
    pub separator: Separator,
    /// Literal repetition count or the name of an earlier variable.
    #[serde(
        default = "default_loop_count",
        skip_serializing_if = "is_default_loop_count"
    )]
    pub loop_count: RawValue,
    /// Lower bound for range sources (code point for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<RawValue>,
    /// Upper bound for range sources (code point for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<RawValue>,
    /// Candidate values for choice-list sources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<RawValue>,
    /// Charset shorthand for charset sources, e.g. `a-z0-9_`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Generator program for custom-code sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
    /// `N`, a variable name, or `min,max` (each side a literal or name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_length: Option<RawValue>,
}

impl VariableSpec {
    fn base(name: &str, data_type: DataType, source_type: SourceType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            source_type,
            separator: Separator::default(),
            loop_count: default_loop_count(),
            min_value: None,
            max_value: None,
            choices: Vec::new(),
            charset: None,
            custom_code: None,
            string_length: None,
        }
    }

    pub fn range(
        name: &str,
        data_type: DataType,
        min: impl Into<RawValue>,
        max: impl Into<RawValue>,
    ) -> Self {
        let mut spec = Self::base(name, data_type, SourceType::Range);
        spec.min_value = Some(min.into());
        spec.max_value = Some(max.into());
        spec
    }

    pub fn choice_list<V: Into<RawValue>>(
        name: &str,
        data_type: DataType,
        choices: impl IntoIterator<Item = V>,
    ) -> Self {
        let mut spec = Self::base(name, data_type, SourceType::ChoiceList);
        spec.choices = choices.into_iter().map(Into::into).collect();
        spec
    }

    pub fn char_set(name: &str, data_type: DataType, charset: &str) -> Self {
        let mut spec = Self::base(name, data_type, SourceType::CharSet);
        spec.charset = Some(charset.to_string());
        spec
    }

    pub fn custom_code(name: &str, data_type: DataType, code: &str) -> Self {
        let mut spec = Self::base(name, data_type, SourceType::CustomCode);
        spec.custom_code = Some(code.to_string());
        spec
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_loop_count(mut self, loop_count: impl Into<RawValue>) -> Self {
        self.loop_count = loop_count.into();
        self
    }

    pub fn with_string_length(mut self, length: impl Into<RawValue>) -> Self {
        self.string_length = Some(length.into());
        self
    }

    /// One-line human description of the rule.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!(
            "variable '{}' ({})",
            self.name,
            self.data_type.as_str()
        )];

        match self.source_type {
            SourceType::Range => {
                let min = self.min_value.as_ref().map(ToString::to_string);
                let max = self.max_value.as_ref().map(ToString::to_string);
                parts.push(format!(
                    "range: {} to {}",
                    min.unwrap_or_default(),
                    max.unwrap_or_default()
                ));
                if self.data_type == DataType::String {
                    parts.push(format!("length: {}", self.length_label()));
                }
            }
            SourceType::ChoiceList => {
                let preview = self
                    .choices
                    .iter()
                    .take(3)
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let more = if self.choices.len() > 3 { "..." } else { "" };
                parts.push(format!("choices: {preview}{more}"));
            }
            SourceType::CharSet => {
                parts.push(format!("charset: {}", self.charset.as_deref().unwrap_or("")));
                if self.data_type == DataType::String {
                    parts.push(format!("length: {}", self.length_label()));
                }
            }
            SourceType::CustomCode => {
                let code = self.custom_code.as_deref().unwrap_or("");
                let preview: String = code.chars().take(30).collect();
                let more = if code.chars().count() > 30 { "..." } else { "" };
                parts.push(format!("custom code: {preview}{more}"));
            }
        }

        if self.loop_count != default_loop_count() {
            parts.push(format!("repeat: {}", self.loop_count));
        }
        parts.push(format!("separator: {}", self.separator.as_str()));
        parts.join(", ")
    }

    fn length_label(&self) -> String {
        self.string_length
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| crate::DEFAULT_STRING_LENGTH.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_range_string() {
        let spec = VariableSpec::range("s", DataType::String, 97, 122)
            .with_string_length("1,n")
            .with_separator(Separator::Newline);
        assert_eq!(
            spec.describe(),
            "variable 's' (string), range: 97 to 122, length: 1,n, separator: newline"
        );
    }

    #[test]
    fn describes_choice_preview() {
        let spec = VariableSpec::choice_list("op", DataType::String, ["+", "-", "*", "/"])
            .with_loop_count("n");
        assert_eq!(
            spec.describe(),
            "variable 'op' (string), choices: +, -, *..., repeat: n, separator: space"
        );
    }
}
