use casegen_core::{DataType, Separator, VariableSpec};
use casegen_generate::{GenerationError, Generator};

fn custom(data_type: DataType, code: &str) -> VariableSpec {
    VariableSpec::custom_code("c", data_type, code)
}

#[test]
fn custom_integer_values_stay_in_declared_range() {
    let spec = custom(
        DataType::Integer,
        "# even numbers only\nfn generate_data() = randint(1, 50) * 2",
    );
    let mut generator = Generator::with_seed(21);
    for _ in 0..30 {
        let value = generator.check_spec(&spec).expect("value");
        let v = value.as_i64().expect("int");
        assert!(v % 2 == 0 && (2..=100).contains(&v));
    }
}

#[test]
fn helper_functions_and_bindings_compose() {
    let code = r#"
let letters = ascii_lowercase()
fn word(n) = join(times(n, pick), '')
fn pick() = choice(letters)
fn generate_word() = concat(upper(word(1)), word(4))
"#;
    let spec = custom(DataType::String, code);
    let mut generator = Generator::with_seed(4);
    let value = generator.check_spec(&spec).expect("value");
    let text = value.as_str().expect("text");
    assert_eq!(text.len(), 5);
    assert!(text.chars().next().is_some_and(|ch| ch.is_ascii_uppercase()));
    assert!(text.chars().skip(1).all(|ch| ch.is_ascii_lowercase()));
}

#[test]
fn float_results_are_coerced() {
    let spec = custom(DataType::Float, "fn generate_data() = '2.5'");
    let value = Generator::with_seed(1).check_spec(&spec).expect("value");
    assert_eq!(value.to_string(), "2.5");

    let spec = custom(DataType::Integer, "fn generate_data() = 7.9");
    let value = Generator::with_seed(1).check_spec(&spec).expect("value");
    assert_eq!(value.as_i64(), Some(7));
}

#[test]
fn list_results_render_as_text() {
    let spec = custom(DataType::String, "fn generate_data() = join(map(str, range(1, 4)), ' ')");
    let value = Generator::with_seed(1).check_spec(&spec).expect("value");
    assert_eq!(value.as_str(), Some("1 2 3"));
}

#[test]
fn missing_entry_point_is_a_configuration_error() {
    let spec = custom(DataType::Integer, "fn helper() = 1");
    let err = Generator::with_seed(1).check_spec(&spec).unwrap_err();
    match err {
        GenerationError::Configuration { variable, message } => {
            assert_eq!(variable, "c");
            assert!(message.contains("entry point"), "{message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn uncoercible_result_is_a_configuration_error() {
    let spec = custom(DataType::Integer, "fn generate_data() = 'abc'");
    let err = Generator::with_seed(1).check_spec(&spec).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("not a valid integer"));
}

#[test]
fn runtime_failures_are_configuration_errors() {
    let spec = custom(DataType::Integer, "fn generate_data() = choice([])");
    let err = Generator::with_seed(1).check_spec(&spec).unwrap_err();
    assert!(err.is_configuration());

    let spec = custom(DataType::Integer, "fn generate_data() = ");
    let err = Generator::with_seed(1).check_spec(&spec).unwrap_err();
    assert!(err.to_string().contains("syntax error"));
}

#[test]
fn blank_code_is_rejected() {
    let spec = custom(DataType::Integer, "   ");
    let err = Generator::with_seed(1).check_spec(&spec).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn custom_code_participates_in_groups() {
    let specs = vec![
        VariableSpec::range("n", DataType::Integer, 2, 2).with_separator(Separator::Newline),
        custom(DataType::String, "fn generate_data() = pattern('[a-c]{3}')").with_loop_count("n"),
    ];
    let group = Generator::with_seed(10).build_group(&specs).expect("group");
    let (head, tail) = group.split_once('\n').expect("two lines");
    let n: usize = head.parse().expect("n");
    let words: Vec<&str> = tail.split(' ').collect();
    assert_eq!(words.len(), n);
    assert!(words
        .iter()
        .all(|word| word.len() == 3 && word.chars().all(|ch| ('a'..='c').contains(&ch))));
}
