use std::fs;
use std::path::Path;

use casegen_core::{DataType, Separator, VariableSpec};
use casegen_template::{Template, TemplateError, TemplateOrigin, TemplateStore};

fn sample(name: &str) -> Template {
    Template::new(
        name,
        vec![
            VariableSpec::range("n", DataType::Integer, 1, 10).with_separator(Separator::Newline),
            VariableSpec::range("arr", DataType::Integer, 1, 100).with_loop_count("n"),
        ],
    )
    .with_description("array of n values")
    .with_count(5)
}

#[test]
fn save_then_load_round_trips_with_timestamp() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");

    let path = store.save(&sample("my array")).expect("save");
    assert_eq!(path, dir.path().join("my_array.json"));

    let loaded = store.load("my array").expect("load");
    assert_eq!(loaded.description, "array of n values");
    assert_eq!(loaded.count, Some(5));
    assert_eq!(loaded.variables, sample("my array").variables);
    assert!(loaded.created_time.is_some());
}

#[test]
fn list_puts_builtins_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");
    store.save(&sample("b")).expect("save b");
    store.save(&sample("a")).expect("save a");
    fs::write(dir.path().join("broken.json"), "{ not json").expect("write broken");

    let entries = store.list().expect("list");
    let builtin_count = store.builtins().len();
    assert!(entries[..builtin_count]
        .iter()
        .all(|entry| entry.origin == TemplateOrigin::BuiltIn));

    let users: Vec<&str> = entries[builtin_count..]
        .iter()
        .map(|entry| entry.template.name.as_str())
        .collect();
    assert_eq!(users, vec!["a", "b"]);
}

#[test]
fn builtins_cannot_be_replaced_or_deleted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");
    let name = store.builtins()[0].name.clone();

    let err = store.save(&sample(&name)).unwrap_err();
    assert!(matches!(err, TemplateError::BuiltIn(_)));
    let err = store.delete(&name).unwrap_err();
    assert!(matches!(err, TemplateError::BuiltIn(_)));
    assert!(store.load(&name).is_ok());
}

#[test]
fn delete_removes_user_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");
    let path = store.save(&sample("gone")).expect("save");

    assert!(store.delete("gone").expect("delete"));
    assert!(!path.exists());
    assert!(!store.delete("gone").expect("second delete"));
    assert!(matches!(
        store.load("gone").unwrap_err(),
        TemplateError::NotFound(_)
    ));
}

#[test]
fn names_sharing_a_file_name_do_not_overwrite_each_other() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");

    let path = store.save(&sample("a/b")).expect("first save");
    store.save(&sample("a/b")).expect("same name overwrites");

    match store.save(&sample("a:b")).unwrap_err() {
        TemplateError::FileNameTaken {
            name,
            existing,
            path: taken,
        } => {
            assert_eq!(name, "a:b");
            assert_eq!(existing, "a/b");
            assert_eq!(taken, path);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(store.load("a/b").expect("load").name, "a/b");
}

#[test]
fn invalid_templates_are_not_saved() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");
    let template = Template::new("empty", Vec::new());

    match store.save(&template).unwrap_err() {
        TemplateError::Invalid { name, report } => {
            assert_eq!(name, "empty");
            assert_eq!(report.errors[0].code, "variables_empty");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!store.path_for("empty").exists());
}

#[test]
fn import_accepts_desktop_exports_and_export_writes_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path().join("templates")).expect("open");
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/desktop_export.json");

    let (saved, validated) = store.import(&fixture, false).expect("import");
    assert!(saved.starts_with(dir.path().join("templates")));
    assert!(validated.warnings.is_empty());

    let exported = dir.path().join("out/exported.json");
    store.export("区间查询", &exported).expect("export");
    let text = fs::read_to_string(&exported).expect("read export");
    let value: serde_json::Value = serde_json::from_str(&text).expect("parse export");
    assert_eq!(value["variables"][0]["data_type"], "integer");
    assert_eq!(value["variables"][3]["separator"], "none");
}

#[test]
fn strict_import_rejects_dangling_references() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");
    let fixture =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dangling_reference.json");

    let err = store.import(&fixture, true).unwrap_err();
    assert!(matches!(err, TemplateError::Invalid { ref name, .. } if name == "dangling"));
    assert!(store.import(&fixture, false).is_ok());
}

#[test]
fn export_of_unknown_template_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TemplateStore::open(dir.path()).expect("open");
    let err = store
        .export("missing", &dir.path().join("x.json"))
        .unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(_)));
}
