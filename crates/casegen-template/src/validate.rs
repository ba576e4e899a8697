use std::collections::HashMap;

use casegen_core::{
    DataType, LengthSpec, RawValue, Separator, SourceType, TEMPLATE_VERSION, VariableSpec,
    expand_charset,
};
use jsonschema::JSONSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{TemplateError, ValidationIssue, ValidationReport};
use crate::model::Template;

/// Parsed template with the warnings it passed with.
#[derive(Debug, Clone)]
pub struct ValidatedTemplate {
    pub template: Template,
    pub warnings: Vec<ValidationIssue>,
}

/// Rewrite label aliases (desktop-tool labels) to their canonical names so
/// that the document can be checked against the JSON Schema.
pub fn normalize_labels(template_json: &mut Value) {
    let Some(variables) = template_json
        .get_mut("variables")
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    for variable in variables.iter_mut().filter_map(Value::as_object_mut) {
        for (key, value) in variable.iter_mut() {
            let canonical = match key.as_str() {
                "data_type" => canonical_label::<DataType>(value),
                "source_type" => canonical_label::<SourceType>(value),
                "separator" => canonical_label::<Separator>(value),
                _ => None,
            };
            if let Some(canonical) = canonical {
                *value = canonical;
            }
        }
    }
}

fn canonical_label<T: DeserializeOwned + Serialize>(value: &Value) -> Option<Value> {
    if !value.is_string() {
        return None;
    }
    let parsed: T = serde_json::from_value(value.clone()).ok()?;
    serde_json::to_value(parsed).ok()
}

/// Validate a template JSON document against the template JSON Schema.
pub fn validate_template_json(
    template_json: &Value,
    template_schema: &Value,
) -> Result<ValidationReport, TemplateError> {
    let compiled = JSONSchema::compile(template_schema)
        .map_err(|err| TemplateError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(template_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
            ));
        }
    }

    Ok(report)
}

/// Check a parsed template for problems the JSON Schema cannot express.
///
/// References that do not resolve to an earlier scalar variable are warnings:
/// generation still runs and falls back to the default value.
pub fn validate_template_semantics(template: &Template) -> ValidationReport {
    let mut report = ValidationReport::default();

    if template.name.trim().is_empty() {
        report.push_error(ValidationIssue::error(
            "name_required",
            "/name",
            "template name must not be empty",
        ));
    }

    if template.version != TEMPLATE_VERSION {
        report.push_warning(ValidationIssue::warning(
            "unsupported_version",
            "/version",
            format!(
                "template version '{}' differs from supported version '{}'",
                template.version, TEMPLATE_VERSION
            ),
        ));
    }

    if template.variables.is_empty() {
        report.push_error(
            ValidationIssue::error(
                "variables_empty",
                "/variables",
                "template must declare at least one variable",
            )
            .with_hint("add a variable rule"),
        );
    }

    if template.count == Some(0) {
        report.push_warning(ValidationIssue::warning(
            "count_zero",
            "/count",
            "a count of 0 generates no data groups",
        ));
    }

    let mut earlier: HashMap<&str, &VariableSpec> = HashMap::new();
    for (idx, spec) in template.variables.iter().enumerate() {
        let base = format!("/variables/{idx}");
        let name = spec.name.trim();

        if name.is_empty() {
            report.push_error(ValidationIssue::error(
                "variable_name_required",
                format!("{base}/name"),
                "variable name must not be empty",
            ));
        } else if earlier.contains_key(name) {
            report.push_error(
                ValidationIssue::error(
                    "duplicate_variable_name",
                    format!("{base}/name"),
                    format!("variable '{name}' is declared more than once"),
                )
                .with_hint("rename one of the variables"),
            );
        }

        validate_source(spec, &base, &mut report);
        validate_string_length(spec, &base, &mut report);
        validate_loop_count(spec, &base, &mut report);
        validate_references(spec, &base, &earlier, &mut report);

        if !name.is_empty() {
            earlier.insert(name, spec);
        }
    }

    report
}

/// Validate the template end-to-end, returning structured issues on failure.
///
/// With `strict`, warnings are promoted to errors.
pub fn validate_template(
    template_json: &Value,
    template_schema: &Value,
    strict: bool,
) -> Result<ValidatedTemplate, ValidationReport> {
    let mut normalized = template_json.clone();
    normalize_labels(&mut normalized);

    let structural = match validate_template_json(&normalized, template_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let template: Template = match serde_json::from_value(normalized) {
        Ok(template) => template,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::error(
                "invalid_template_json",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    let mut semantic = validate_template_semantics(&template);
    if strict {
        semantic.escalate_warnings();
    }
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedTemplate {
        template,
        warnings: semantic.warnings,
    })
}

fn validate_source(spec: &VariableSpec, base: &str, report: &mut ValidationReport) {
    match spec.source_type {
        SourceType::Range => {
            if spec.data_type == DataType::Char {
                report.push_error(
                    ValidationIssue::error(
                        "incompatible_source",
                        format!("{base}/source_type"),
                        "range sources cannot produce char values",
                    )
                    .with_hint("use a char_set or choice_list source for chars"),
                );
            }
            for (field, value) in [("min_value", &spec.min_value), ("max_value", &spec.max_value)] {
                if value.is_none() {
                    report.push_error(ValidationIssue::error(
                        "range_bound_missing",
                        format!("{base}/{field}"),
                        format!("range source requires {field}"),
                    ));
                }
            }
            if spec.data_type == DataType::String {
                validate_code_point_bounds(spec, base, report);
            }
        }
        SourceType::ChoiceList => {
            if spec.choices.is_empty() {
                report.push_error(ValidationIssue::error(
                    "choices_empty",
                    format!("{base}/choices"),
                    "choice list must contain at least one value",
                ));
            }
        }
        SourceType::CharSet => {
            if !matches!(spec.data_type, DataType::Char | DataType::String) {
                report.push_error(
                    ValidationIssue::error(
                        "incompatible_source",
                        format!("{base}/source_type"),
                        format!(
                            "char_set sources cannot produce {} values",
                            spec.data_type.as_str()
                        ),
                    )
                    .with_hint("use data_type char or string"),
                );
            }
            let empty = spec
                .charset
                .as_deref()
                .is_none_or(|definition| expand_charset(definition).is_empty());
            if empty {
                report.push_error(
                    ValidationIssue::error(
                        "charset_empty",
                        format!("{base}/charset"),
                        "charset definition expands to no characters",
                    )
                    .with_hint("use a definition such as a-z0-9"),
                );
            }
        }
        SourceType::CustomCode => {
            let blank = spec
                .custom_code
                .as_deref()
                .is_none_or(|code| code.trim().is_empty());
            if blank {
                report.push_error(ValidationIssue::error(
                    "custom_code_missing",
                    format!("{base}/custom_code"),
                    "custom_code source requires a program",
                ));
            }
        }
    }
}

fn validate_code_point_bounds(spec: &VariableSpec, base: &str, report: &mut ValidationReport) {
    for (field, value) in [("min_value", &spec.min_value), ("max_value", &spec.max_value)] {
        let Some(number) = value.as_ref().and_then(RawValue::literal_number) else {
            continue;
        };
        let code = number.as_i64();
        if u32::try_from(code).ok().and_then(char::from_u32).is_none() {
            report.push_warning(ValidationIssue::warning(
                "invalid_code_point",
                format!("{base}/{field}"),
                format!("{code} is not a valid character code point"),
            ));
        }
    }
}

fn validate_string_length(spec: &VariableSpec, base: &str, report: &mut ValidationReport) {
    let Some(raw) = &spec.string_length else {
        return;
    };
    let path = format!("{base}/string_length");

    if spec.data_type != DataType::String {
        report.push_warning(ValidationIssue::warning(
            "string_length_ignored",
            path.clone(),
            format!(
                "string_length has no effect on {} values",
                spec.data_type.as_str()
            ),
        ));
    }

    let length = match LengthSpec::parse(raw) {
        Ok(length) => length,
        Err(err) => {
            report.push_error(ValidationIssue::error(
                "invalid_string_length",
                path,
                err.to_string(),
            ));
            return;
        }
    };

    let literal = |value: &RawValue| value.literal_number().map(|number| number.as_i64());
    match length {
        LengthSpec::Fixed(value) => {
            if let Some(len) = literal(&value)
                && len < 0
            {
                report.push_error(ValidationIssue::error(
                    "invalid_string_length",
                    path,
                    format!("string length must not be negative (got {len})"),
                ));
            }
        }
        LengthSpec::Between(lo, hi) => match (literal(&lo), literal(&hi)) {
            (Some(lo), _) if lo < 0 => report.push_error(ValidationIssue::error(
                "invalid_string_length",
                path,
                format!("string length must not be negative (got {lo})"),
            )),
            (_, Some(hi)) if hi < 0 => report.push_error(ValidationIssue::error(
                "invalid_string_length",
                path,
                format!("string length must not be negative (got {hi})"),
            )),
            (Some(lo), Some(hi)) if lo > hi => report.push_error(ValidationIssue::error(
                "invalid_string_length",
                path,
                format!("minimum length {lo} exceeds maximum length {hi}"),
            )),
            _ => {}
        },
    }
}

fn validate_loop_count(spec: &VariableSpec, base: &str, report: &mut ValidationReport) {
    if let Some(count) = spec.loop_count.literal_number()
        && count.as_i64() <= 0
    {
        report.push_warning(ValidationIssue::warning(
            "loop_count_empty",
            format!("{base}/loop_count"),
            format!(
                "loop count {} produces no values",
                spec.loop_count
            ),
        ));
    }
}

/// Every (path, referenced name) pair the engine will try to resolve.
fn references(spec: &VariableSpec, base: &str) -> Vec<(String, String)> {
    let mut refs = Vec::new();
    if let Some(name) = spec.loop_count.reference() {
        refs.push((format!("{base}/loop_count"), name.to_string()));
    }
    if spec.source_type == SourceType::Range {
        for (field, value) in [("min_value", &spec.min_value), ("max_value", &spec.max_value)] {
            if let Some(name) = value.as_ref().and_then(RawValue::reference) {
                refs.push((format!("{base}/{field}"), name.to_string()));
            }
        }
    }
    if spec.data_type == DataType::String
        && let Some(Ok(length)) = spec.string_length.as_ref().map(LengthSpec::parse)
    {
        for name in length.references() {
            refs.push((format!("{base}/string_length"), name.to_string()));
        }
    }
    refs
}

fn validate_references(
    spec: &VariableSpec,
    base: &str,
    earlier: &HashMap<&str, &VariableSpec>,
    report: &mut ValidationReport,
) {
    for (path, name) in references(spec, base) {
        let Some(target) = earlier.get(name.as_str()) else {
            report.push_warning(
                ValidationIssue::warning(
                    "unresolved_reference",
                    path,
                    format!("'{name}' does not name an earlier variable; the default value is used"),
                )
                .with_hint(format!("declare '{name}' before this variable or use a literal")),
            );
            continue;
        };

        let single = target
            .loop_count
            .literal_number()
            .is_some_and(|count| count.as_i64() == 1);
        if !single {
            report.push_warning(ValidationIssue::warning(
                "sequence_reference",
                path.clone(),
                format!(
                    "'{name}' may produce a sequence of values; references to sequences use the default value"
                ),
            ));
        }

        if matches!(target.data_type, DataType::String | DataType::Char) {
            report.push_warning(ValidationIssue::warning(
                "non_numeric_reference",
                path,
                format!(
                    "'{name}' is a {} variable and may not hold a number",
                    target.data_type.as_str()
                ),
            ));
        }
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
