use casegen_template::template_json_schema;

fn main() {
    let schema = template_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize template json schema");
    println!("{json}");
}
