//! End-to-end serialization: schemas through the registry, out to tagged JSON, and back.

use rand::Rng;
use regson::*;
use std::any::Any;
use std::sync::Arc;

fn kwargs(entries: Vec<(&str, Value)>) -> Fields {
    entries.into_iter().collect()
}

#[test]
fn flat_record_wire_format() {
    let schema = Schema::build("Point")
        .namespace("rt_flat")
        .field(Field::new("x"))
        .field(Field::new("y"))
        .finish();
    let p = Record::new(&schema, vec![Value::from(3), Value::from(4)], Fields::new()).unwrap();

    let text = p.json().unwrap();
    assert_eq!(text, r#"{"x":3,"y":4,"SERIALIZER_TYPE":"rt_flat.Point"}"#);

    let back = Record::from_json(&text).unwrap();
    assert_eq!(back, p);
    assert_eq!(back.schema().id(), schema.id());
}

#[test]
fn nested_records_revive_inside_out() {
    let inner = Schema::build("Inner")
        .namespace("rt_nested")
        .field(Field::new("n"))
        .finish();
    let outer = Schema::build("Outer")
        .namespace("rt_nested")
        .field(Field::new("child"))
        .field(Field::new("children").factory(|| Value::Seq(Vec::new())))
        .finish();

    let a = Record::new(&inner, vec![Value::from(1)], Fields::new()).unwrap();
    let b = Record::new(&inner, vec![Value::from(2)], Fields::new()).unwrap();
    let o = Record::new(
        &outer,
        vec![Value::Record(a.clone())],
        kwargs(vec![(
            "children",
            Value::Seq(vec![Value::Record(b.clone())]),
        )]),
    )
    .unwrap();

    let text = dumps(&Value::Record(o.clone())).unwrap();
    let back = loads(&text).unwrap();
    let back = back.record().unwrap();
    assert_eq!(back.get("child"), Some(&Value::Record(a)));
    assert_eq!(
        back.get("children"),
        Some(&Value::Seq(vec![Value::Record(b)]))
    );
}

#[test]
fn decode_reruns_defaults_then_overlays_state() {
    let schema = Schema::build("Versioned")
        .namespace("rt_defaults")
        .field(Field::new("value"))
        .field(Field::new("note").default(Value::from("fresh")))
        .finish();

    // a document written before "note" existed carries no entry for it
    let text = r#"{"value":10,"SERIALIZER_TYPE":"rt_defaults.Versioned"}"#;
    let back = Record::from_json(text).unwrap();
    assert_eq!(back.get("value"), Some(&Value::from(10)));
    assert_eq!(back.get("note"), Some(&Value::from("fresh")));
}

#[test]
fn required_fields_force_raw_reconstruction() {
    let schema = Schema::build("Strict")
        .namespace("rt_raw")
        .field(Field::new("must"))
        .finish();
    let r = Record::new(&schema, vec![Value::from(1)], Fields::new()).unwrap();

    // zero-argument construction fails, so decoding allocates raw and applies state
    let (rebuilt, how) = Record::reconstruct(&schema, r.state());
    assert_eq!(how, Reconstructed::Allocated);
    assert_eq!(rebuilt, r);

    let back = Record::from_json(&r.json().unwrap()).unwrap();
    assert_eq!(back, r);
}

#[test]
fn frozen_records_round_trip() {
    let schema = Schema::build("Sealed")
        .namespace("rt_frozen")
        .field(Field::new("x").default(Value::from(1)))
        .frozen()
        .finish();
    let r = Record::new(&schema, Vec::new(), Fields::new()).unwrap();
    let back = Record::from_json(&r.json().unwrap()).unwrap();
    assert_eq!(back, r);
}

#[test]
fn custom_pair_wraps_non_map_payload() {
    let schema = Schema::build("Pair")
        .namespace("rt_custom")
        .field(Field::new("a"))
        .field(Field::new("b"))
        .finish_with(
            |value| match value.record() {
                Some(r) => Ok(Value::Seq(vec![r["a"].clone(), r["b"].clone()])),
                None => Err(EncodeError::Message("expected a record".to_string())),
            },
            |payload| match payload.seq() {
                Some([a, b]) => {
                    let schema = get_serializer("rt_custom.Pair")
                        .and_then(|s| s.schema().cloned())
                        .ok_or_else(|| DecodeError::Message("pair schema missing".to_string()))?;
                    Record::new(&schema, vec![a.clone(), b.clone()], Fields::new())
                        .map(Value::Record)
                        .map_err(DecodeError::from)
                }
                _ => Err(DecodeError::Message("expected a two-element list".to_string())),
            },
        );

    let r = Record::new(&schema, vec![Value::from(1), Value::from(2)], Fields::new()).unwrap();
    let text = dumps(&Value::Record(r.clone())).unwrap();
    assert_eq!(
        text,
        r#"{"SERIALIZER_OBJ":[1,2],"SERIALIZER_TYPE":"rt_custom.Pair"}"#
    );
    assert_eq!(loads(&text).unwrap(), Value::Record(r));
}

#[derive(Debug, PartialEq, Clone)]
struct Timestamp(i64);

impl OtherValue for Timestamp {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_value(&self, other: &dyn OtherValue) -> bool {
        other.as_any().downcast_ref::<Timestamp>() == Some(self)
    }
}

#[test]
fn foreign_values_round_trip() {
    register_other::<Timestamp, _, _>(
        "rt_other.Timestamp",
        |ts| Ok(Value::from(ts.0)),
        |payload| {
            payload
                .int()
                .map(|i| Timestamp(i as i64))
                .ok_or_else(|| DecodeError::Message("timestamp payload must be an integer".to_string()))
        },
    );

    let value = Value::Other(Other::new(Timestamp(1_234)));
    let text = dumps(&value).unwrap();
    assert_eq!(
        text,
        r#"{"SERIALIZER_OBJ":1234,"SERIALIZER_TYPE":"rt_other.Timestamp"}"#
    );

    let back = loads(&text).unwrap();
    assert_eq!(back.downcast::<Timestamp>(), Some(&Timestamp(1_234)));
    assert_eq!(back, value);

    unregister_other::<Timestamp>();
    let err = dumps(&value).unwrap_err();
    assert!(err.to_string().contains("no serializer registered"));
}

#[test]
fn unknown_tag_inside_known_record() {
    let schema = Schema::build("Holder")
        .namespace("rt_unknown")
        .field(Field::new("payload"))
        .finish();

    let text = concat!(
        r#"{"payload":{"w":1,"SERIALIZER_TYPE":"elsewhere.Widget"},"#,
        r#""SERIALIZER_TYPE":"rt_unknown.Holder"}"#,
    );
    let back = Record::from_json(text).unwrap();
    // the unknown inner tag degrades to a plain map; the outer record still revives
    assert_eq!(back.schema().id(), schema.id());
    let inner = back["payload"].map().unwrap();
    assert_eq!(inner.get("w"), Some(&Value::from(1)));
    assert!(!inner.contains(TAG_KEY));
}

#[test]
fn ancestor_fallback_tags_with_ancestor() {
    let base = Schema::build("Animal")
        .namespace("rt_ancestor")
        .field(Field::new("name").default(Value::from("?")))
        .finish();
    let derived = Schema::build("Dog")
        .namespace("rt_ancestor")
        .extend(&base)
        .finish_unregistered();

    let d = Record::new(&derived, vec![Value::from("rex")], Fields::new()).unwrap();
    let text = dumps(&Value::Record(d)).unwrap();
    // the unregistered subtype serializes under its ancestor's tag and revives as the ancestor
    assert_eq!(
        text,
        r#"{"name":"rex","SERIALIZER_TYPE":"rt_ancestor.Animal"}"#
    );
    let back = Record::from_json(&text).unwrap();
    assert_eq!(back.schema().id(), base.id());
}

#[test]
fn message_carries_arbitrary_entries() {
    let msg = Schema::message();
    let mut m = Record::new(&msg, Vec::new(), Fields::new()).unwrap();
    m.update(kwargs(vec![
        ("kind", Value::from("greeting")),
        ("body", Value::from("hello")),
    ]))
    .unwrap();

    let text = m.json().unwrap();
    assert_eq!(
        text,
        r#"{"kind":"greeting","body":"hello","SERIALIZER_TYPE":"regson.Message"}"#
    );
    let back = Record::from_json(&text).unwrap();
    assert_eq!(back.get("kind"), Some(&Value::from("greeting")));
    assert_eq!(back.get("body"), Some(&Value::from("hello")));
    assert_eq!(back.schema().id(), msg.id());
}

#[test]
fn dump_and_load_through_a_buffer() {
    let schema = Schema::build("Buffered")
        .namespace("rt_io")
        .field(Field::new("x"))
        .finish();
    let r = Record::new(&schema, vec![Value::from(42)], Fields::new()).unwrap();

    let mut buf = Vec::new();
    dump(&Value::Record(r.clone()), &mut buf).unwrap();
    let back = load(buf.as_slice()).unwrap();
    assert_eq!(back, Value::Record(r));
}

#[test]
fn loads_with_revives_untagged_objects() {
    let schema = Schema::build("Tagged")
        .namespace("rt_hook")
        .field(Field::new("x").default(Value::from(0)))
        .finish();

    let hook_schema = Arc::clone(&schema);
    let text = r#"{"plain":{"x":7},"tagged":{"x":8,"SERIALIZER_TYPE":"rt_hook.Tagged"}}"#;
    let v = loads_with(text, move |fields| {
        let (record, _) = Record::reconstruct(&hook_schema, fields);
        Value::Record(record)
    })
    .unwrap();

    // the outer object itself went through the hook as well
    let outer = v.record().unwrap();
    assert_eq!(outer.get("plain").and_then(Value::record).map(|r| r["x"].clone()), Some(Value::from(7)));
    assert_eq!(outer.get("tagged").and_then(Value::record).map(|r| r["x"].clone()), Some(Value::from(8)));
}

#[test]
fn non_finite_floats_round_trip() {
    let schema = Schema::build("Reading")
        .namespace("rt_float")
        .field(Field::new("f"))
        .finish();

    let r = Record::new(&schema, vec![Value::from(f64::NAN)], Fields::new()).unwrap();
    let text = r.json().unwrap();
    // JSON has no NaN literal, so the value travels under the reserved float tag
    assert_eq!(
        text,
        concat!(
            r#"{"f":{"SERIALIZER_OBJ":"NaN","SERIALIZER_TYPE":"regson.float"},"#,
            r#""SERIALIZER_TYPE":"rt_float.Reading"}"#,
        )
    );
    let back = Record::from_json(&text).unwrap();
    assert_eq!(back, r);
    assert_eq!(back.get("f"), Some(&Value::from(f64::NAN)));

    for f in [f64::INFINITY, f64::NEG_INFINITY] {
        let r = Record::new(&schema, vec![Value::from(f)], Fields::new()).unwrap();
        let back = Record::from_json(&r.json().unwrap()).unwrap();
        assert_eq!(back.get("f"), Some(&Value::from(f)));
    }

    // a bare non-finite float round-trips outside any record too
    let back = loads(&dumps(&Value::from(f64::INFINITY)).unwrap()).unwrap();
    assert_eq!(back.float(), Some(f64::INFINITY));
}

#[test]
fn random_points_round_trip() {
    let schema = Schema::build("Sample")
        .namespace("rt_rand")
        .field(Field::new("i"))
        .field(Field::new("u"))
        .field(Field::new("f"))
        .field(Field::new("s"))
        .finish();

    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let r = Record::new(
            &schema,
            vec![
                Value::from(rng.gen::<i64>()),
                Value::from(rng.gen::<u64>()),
                Value::from(rng.gen::<f64>()),
                Value::from(format!("s{}", rng.gen::<u32>())),
            ],
            Fields::new(),
        )
        .unwrap();
        let back = Record::from_json(&r.json().unwrap()).unwrap();
        assert_eq!(back, r);
    }
}
