//! Registry semantics observable through the codec: replacement, removal, and the
//! first-registered-ancestor fallback.

use regson::*;
use std::sync::Arc;

#[test]
fn reregistering_replaces_the_pair() {
    let schema = Schema::build("Swapped")
        .namespace("reg_it")
        .field(Field::new("x").default(Value::from(1)))
        .finish();
    let r = Record::new(&schema, Vec::new(), Fields::new()).unwrap();

    assert_eq!(
        r.json().unwrap(),
        r#"{"x":1,"SERIALIZER_TYPE":"reg_it.Swapped"}"#
    );

    register_with(
        &schema,
        Some(Arc::new(|_: &Value| Ok(Value::from("redacted")))),
        None,
    );
    assert_eq!(
        r.json().unwrap(),
        r#"{"SERIALIZER_OBJ":"redacted","SERIALIZER_TYPE":"reg_it.Swapped"}"#
    );

    // registering again restores the derived pair
    register(&schema);
    assert_eq!(
        r.json().unwrap(),
        r#"{"x":1,"SERIALIZER_TYPE":"reg_it.Swapped"}"#
    );
}

#[test]
fn unregistered_records_fail_to_encode() {
    let schema = Schema::build("Dropped")
        .namespace("reg_it")
        .field(Field::new("x").default(Value::from(1)))
        .finish();
    let r = Record::new(&schema, Vec::new(), Fields::new()).unwrap();
    assert!(r.json().is_ok());

    unregister(&schema);
    let err = r.json().unwrap_err();
    assert!(err.to_string().contains("no serializer registered"));

    // removing again is a no-op
    unregister(&schema);
    assert!(get_serializer("reg_it.Dropped").is_none());
}

#[test]
fn ancestor_fallback_is_registration_ordered() {
    let first = Schema::build("FirstBase")
        .namespace("reg_it")
        .field(Field::new("a").default(Value::from(1)))
        .finish();
    let second = Schema::build("SecondBase")
        .namespace("reg_it")
        .field(Field::new("b").default(Value::from(2)))
        .finish();
    let derived = Schema::build("Both")
        .namespace("reg_it")
        .extend(&first)
        .extend(&second)
        .finish_unregistered();

    let r = Record::new(&derived, Vec::new(), Fields::new()).unwrap();
    let text = r.json().unwrap();
    // whichever ancestor registered first claims the record
    assert!(text.contains(r#""SERIALIZER_TYPE":"reg_it.FirstBase""#));
}

#[test]
fn tag_lookup_resolves_schema() {
    let schema = Schema::build("Found").namespace("reg_it").finish();
    let entry = get_serializer("reg_it.Found").unwrap();
    assert_eq!(entry.tag(), "reg_it.Found");
    assert_eq!(entry.schema().map(|s| s.id()), Some(schema.id()));
    assert!(get_serializer("reg_it.NeverMade").is_none());
}
