use casegen_core::{DataType, RawValue, Separator, SourceType, VariableSpec};

#[test]
fn serializes_spec_deterministically() {
    let spec = VariableSpec::range("n", DataType::Integer, 1, "10").with_separator(Separator::Newline);

    let json = serde_json::to_string_pretty(&spec).expect("serialize spec");
    let expected = r#"{
  "name": "n",
  "data_type": "integer",
  "source_type": "range",
  "separator": "newline",
  "min_value": 1,
  "max_value": "10"
}"#;
    assert_eq!(json, expected);
}

#[test]
fn non_default_loop_count_is_written() {
    let spec = VariableSpec::choice_list("op", DataType::Char, ["+", "-"]).with_loop_count("n");
    let value = serde_json::to_value(&spec).expect("serialize spec");
    assert_eq!(value["loop_count"], serde_json::json!("n"));
    assert_eq!(value["choices"], serde_json::json!(["+", "-"]));
}

#[test]
fn missing_optional_fields_take_defaults() {
    let spec: VariableSpec = serde_json::from_str(
        r#"{"name": "s", "data_type": "string", "source_type": "char_set", "charset": "a-z"}"#,
    )
    .expect("parse spec");
    assert_eq!(spec.separator, Separator::Space);
    assert_eq!(spec.loop_count, RawValue::Int(1));
    assert_eq!(spec.string_length, None);
    assert!(spec.choices.is_empty());
}

#[test]
fn mixed_literal_kinds_parse_untagged() {
    let spec: VariableSpec = serde_json::from_str(
        r#"{"name": "x", "data_type": "float", "source_type": "choice_list",
            "choices": [1, 2.5, "three"], "string_length": "1,n"}"#,
    )
    .expect("parse spec");
    assert_eq!(
        spec.choices,
        vec![
            RawValue::Int(1),
            RawValue::Float(2.5),
            RawValue::text("three")
        ]
    );
    assert_eq!(spec.string_length, Some(RawValue::text("1,n")));
}

#[test]
fn desktop_tool_labels_are_accepted() {
    let spec: VariableSpec = serde_json::from_str(
        r#"{"name": "arr", "data_type": "整数", "source_type": "数据范围",
            "separator": "换行", "loop_count": "n", "min_value": "1", "max_value": "100"}"#,
    )
    .expect("parse legacy spec");
    assert_eq!(spec.data_type, DataType::Integer);
    assert_eq!(spec.source_type, SourceType::Range);
    assert_eq!(spec.separator, Separator::Newline);
    assert_eq!(spec.loop_count, RawValue::text("n"));

    let separator: Separator = serde_json::from_str(r#""制表符""#).expect("parse separator");
    assert_eq!(separator, Separator::Tab);
    let source: SourceType = serde_json::from_str(r#""来自代码""#).expect("parse source");
    assert_eq!(source, SourceType::CustomCode);
}

#[test]
fn unknown_labels_are_rejected() {
    let err = serde_json::from_str::<DataType>(r#""decimal""#);
    assert!(err.is_err());
}
