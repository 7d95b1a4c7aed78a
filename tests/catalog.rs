use rlist::{Catalog, List, RlistError};
use serde_json::json;

#[test]
fn append_creates_list_and_pushes_to_tail() {
    let mut catalog = Catalog::new();
    assert!(catalog.is_empty());

    catalog.append("numbers", 5);
    catalog.append("numbers", 7);

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.size("numbers").unwrap(), 2);
    assert_eq!(catalog.last("numbers").unwrap(), 7);
    assert_eq!(
        catalog.get("numbers"),
        Some(&List {
            name: "numbers".to_owned(),
            items: vec![5, 7],
        })
    );
}

#[test]
fn pop_is_last_in_first_out() {
    let mut catalog = Catalog::new();
    for v in 1..=3 {
        catalog.append("stack", v);
    }

    assert_eq!(catalog.pop("stack").unwrap(), 3);
    assert_eq!(catalog.pop("stack").unwrap(), 2);
    assert_eq!(catalog.last("stack").unwrap(), 1);
    assert_eq!(catalog.size("stack").unwrap(), 1);
}

#[test]
fn unknown_list_is_not_found() {
    let mut catalog = Catalog::new();
    assert!(matches!(catalog.last("nope"), Err(RlistError::NotFound(n)) if n == "nope"));
    assert!(matches!(catalog.pop("nope"), Err(RlistError::NotFound(_))));
    assert!(matches!(catalog.size("nope"), Err(RlistError::NotFound(_))));
}

#[test]
fn drained_list_is_empty_but_still_sized_and_named() {
    let mut catalog = Catalog::new();
    catalog.append("a", 1);
    catalog.pop("a").unwrap();

    assert!(matches!(catalog.last("a"), Err(RlistError::EmptyList(n)) if n == "a"));
    assert!(matches!(catalog.pop("a"), Err(RlistError::EmptyList(_))));
    assert_eq!(catalog.size("a").unwrap(), 0);
    assert!(catalog.names().contains("a"));
}

#[test]
fn names_lists_every_created_list() {
    let mut catalog = Catalog::new();
    catalog.append("b", 1);
    catalog.append("a", 2);
    catalog.append("b", 3);

    let names: Vec<_> = catalog.names().into_iter().collect();
    assert_eq!(names, vec!["a".to_owned(), "b".to_owned()]);
}

#[test]
fn serializes_with_name_and_items_fields() {
    let mut catalog = Catalog::new();
    catalog.append("numbers", 5);
    catalog.append("numbers", -7);

    let value = serde_json::to_value(&catalog).unwrap();
    assert_eq!(
        value,
        json!({ "numbers": { "name": "numbers", "items": [5, -7] } })
    );
}

#[test]
fn reads_files_written_by_the_previous_server() {
    let legacy = r#"{"numbers":{"Nome":"numbers","Itens":[5,7]},"never":{"Nome":"never","Itens":null}}"#;
    let catalog: Catalog = serde_json::from_str(legacy).unwrap();

    assert_eq!(catalog.last("numbers").unwrap(), 7);
    assert_eq!(catalog.size("never").unwrap(), 0);

    // always written back with the current field names
    let rewritten = serde_json::to_string(&catalog).unwrap();
    assert!(rewritten.contains(r#""items":[5,7]"#));
    assert!(!rewritten.contains("Itens"));
}

#[test]
fn missing_items_field_reads_as_empty() {
    let catalog: Catalog = serde_json::from_str(r#"{"a":{"name":"a"}}"#).unwrap();
    assert_eq!(catalog.size("a").unwrap(), 0);
}
