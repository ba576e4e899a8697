use std::fs;
use std::path::{Path, PathBuf};

use casegen_core::{DataType, SourceType};
use casegen_template::{
    TemplateStore, template_json_schema_value, validate_template, validate_template_json,
};
use serde_json::{Value, json};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_json(path: &Path) -> Value {
    let contents =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("missing json at {}", path.display()));
    serde_json::from_str(&contents).expect("parse json")
}

fn schema() -> Value {
    template_json_schema_value().expect("template schema")
}

#[test]
fn builtin_templates_validate_cleanly() {
    let store = TemplateStore::open("unused").expect("open store");
    let schema = schema();
    for template in store.builtins() {
        let json = serde_json::to_value(template).expect("serialize template");
        let validated = validate_template(&json, &schema, true)
            .unwrap_or_else(|report| panic!("{} failed: {:?}", template.name, report.errors));
        assert!(validated.warnings.is_empty(), "{}", template.name);
    }
}

#[test]
fn desktop_export_validates_after_label_normalization() {
    let json = load_json(&fixture("desktop_export.json"));
    let validated = validate_template(&json, &schema(), true).expect("desktop template");
    let template = validated.template;
    assert_eq!(template.name, "区间查询");
    assert_eq!(template.variables.len(), 4);
    assert_eq!(template.variables[2].data_type, DataType::Char);
    assert_eq!(template.variables[3].source_type, SourceType::CharSet);
}

#[test]
fn raw_desktop_labels_fail_the_schema_alone() {
    let json = load_json(&fixture("desktop_export.json"));
    let report = validate_template_json(&json, &schema()).expect("validate json");
    assert!(!report.is_ok());
    assert!(report
        .errors
        .iter()
        .all(|issue| issue.code == "schema_violation" && issue.path.starts_with("/variables/")));
}

#[test]
fn dangling_reference_is_a_warning_unless_strict() {
    let json = load_json(&fixture("dangling_reference.json"));
    let schema = schema();

    let validated = validate_template(&json, &schema, false).expect("lenient validation");
    assert_eq!(validated.warnings.len(), 1);
    let warning = &validated.warnings[0];
    assert_eq!(warning.code, "unresolved_reference");
    assert_eq!(warning.path, "/variables/0/loop_count");

    let report = validate_template(&json, &schema, true).expect_err("strict validation");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "unresolved_reference");
    assert!(report.warnings.is_empty());
}

#[test]
fn structural_errors_stop_before_semantics() {
    let json = json!({
        "name": "broken",
        "variables": [{"name": "x", "data_type": "decimal", "source_type": "range"}]
    });
    let report = validate_template(&json, &schema(), false).expect_err("invalid");
    assert!(!report.errors.is_empty());
    assert!(report
        .errors
        .iter()
        .all(|issue| issue.code == "schema_violation"));
}

#[test]
fn semantic_errors_are_located() {
    let json = json!({
        "name": "  ",
        "variables": [
            {"name": "n", "data_type": "integer", "source_type": "range", "min_value": 1},
            {"name": "n", "data_type": "integer", "source_type": "char_set", "charset": ""},
            {"name": "", "data_type": "string", "source_type": "choice_list"},
            {"name": "c", "data_type": "string", "source_type": "custom_code", "custom_code": " "},
            {"name": "s", "data_type": "string", "source_type": "char_set",
             "charset": "ab", "string_length": "9,3"}
        ]
    });
    let report = validate_template(&json, &schema(), false).expect_err("invalid");
    let located: Vec<(&str, &str)> = report
        .errors
        .iter()
        .map(|issue| (issue.code.as_str(), issue.path.as_str()))
        .collect();

    assert_eq!(
        located,
        vec![
            ("name_required", "/name"),
            ("range_bound_missing", "/variables/0/max_value"),
            ("duplicate_variable_name", "/variables/1/name"),
            ("incompatible_source", "/variables/1/source_type"),
            ("charset_empty", "/variables/1/charset"),
            ("variable_name_required", "/variables/2/name"),
            ("choices_empty", "/variables/2/choices"),
            ("custom_code_missing", "/variables/3/custom_code"),
            ("invalid_string_length", "/variables/4/string_length"),
        ]
    );
}

#[test]
fn sequence_and_text_references_warn() {
    let json = json!({
        "name": "refs",
        "variables": [
            {"name": "xs", "data_type": "integer", "source_type": "choice_list",
             "choices": [1, 2], "loop_count": 3},
            {"name": "w", "data_type": "string", "source_type": "char_set", "charset": "a"},
            {"name": "y", "data_type": "integer", "source_type": "range",
             "min_value": "xs", "max_value": "w"}
        ]
    });
    let validated = validate_template(&json, &schema(), false).expect("valid");
    let codes: Vec<&str> = validated
        .warnings
        .iter()
        .map(|issue| issue.code.as_str())
        .collect();
    assert_eq!(codes, vec!["sequence_reference", "non_numeric_reference"]);
}
