use proptest::prelude::*;
use sheet_sync::schema::{AliasBinding, normalize_header};

proptest! {
    #[test]
    fn header_normalization_is_idempotent(raw in "\\PC*") {
        let once = normalize_header(&raw);
        let twice = normalize_header(&once);
        prop_assert_eq!(once, twice);
    }
}

#[test]
fn binding_is_insensitive_to_case_and_whitespace() {
    let headers: Vec<String> = ["  NOME  ", "IDADE (ANOS)", " Município "]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let binding = AliasBinding::resolve(&headers).unwrap();
    let names: Vec<&str> = binding.fields().iter().map(|b| b.field.name).collect();
    assert_eq!(names, vec!["name", "age", "city"]);
}

#[test]
fn unbound_fields_are_simply_absent() {
    let headers = vec!["cidade".to_string()];
    let binding = AliasBinding::resolve(&headers).unwrap();
    assert!(binding.is_bound("city"));
    assert!(!binding.is_bound("name"));
    assert!(!binding.is_bound("age"));
}
