use serde_json::json;
use strand_core::Value;

use super::assemble::{Assembly, reduce};

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn assemble(parts: Vec<(Option<Value>, bool)>) -> serde_json::Value {
    let mut assembly = Assembly::new();
    for (value, spread) in parts {
        assembly.push(value, spread);
    }
    assembly.finish().to_json()
}

#[test]
fn missing_values_are_skipped() {
    let result = assemble(vec![(None, false), (Some(v(json!("a"))), false), (None, true)]);

    assert_eq!(result, json!(["a"]));
}

#[test]
fn arrays_nest_unless_spread() {
    let result = assemble(vec![
        (Some(v(json!([1, 2]))), false),
        (Some(v(json!([3, 4]))), true),
    ]);

    assert_eq!(result, json!([[1, 2], 3, 4]));
}

#[test]
fn spread_scalar_is_appended() {
    let result = assemble(vec![(Some(v(json!("x"))), true)]);

    assert_eq!(result, json!(["x"]));
}

#[test]
fn objects_merge_into_first_object() {
    let result = assemble(vec![
        (Some(v(json!("lead"))), false),
        (Some(v(json!({"a": 1}))), false),
        (Some(v(json!("mid"))), false),
        (Some(v(json!({"b": 2, "a": 3}))), false),
    ]);

    assert_eq!(result, json!(["lead", {"a": 3, "b": 2}, "mid"]));
}

#[test]
fn spread_objects_stay_separate() {
    let result = assemble(vec![
        (Some(v(json!([{"a": 1}, {"a": 2}]))), true),
        (Some(v(json!([{"a": 3}]))), true),
    ]);

    assert_eq!(result, json!([{"a": 1}, {"a": 2}, {"a": 3}]));
}

#[test]
fn later_object_merges_into_first_spread_object() {
    let result = assemble(vec![
        (Some(v(json!(["x", {"a": 1}]))), true),
        (Some(v(json!({"b": 2}))), false),
    ]);

    assert_eq!(result, json!(["x", {"a": 1, "b": 2}]));
}

#[test]
fn merge_keeps_key_order() {
    let mut assembly = Assembly::new();
    assembly.push(Some(v(json!({"z": 1}))), false);
    assembly.push(Some(v(json!({"a": 2}))), false);

    let Value::Array(items) = assembly.finish() else {
        panic!("assembly is an array");
    };
    let keys: Vec<&str> = items[0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["z", "a"]);
}

#[test]
fn reduce_merges_objects() {
    let reduced = reduce(v(json!([{"a": 1}, "skip", {"b": 2}])));

    assert_eq!(reduced.map(|r| r.to_json()), Some(json!({"a": 1, "b": 2})));
}

#[test]
fn reduce_takes_first_without_objects() {
    let reduced = reduce(v(json!(["first", "second"])));

    assert_eq!(reduced.map(|r| r.to_json()), Some(json!("first")));
}

#[test]
fn reduce_empty_array_is_nothing() {
    assert_eq!(reduce(Value::empty_array()), None);
}

#[test]
fn reduce_passes_non_arrays_through() {
    assert_eq!(reduce(v(json!("x"))), Some(v(json!("x"))));
    assert_eq!(reduce(Value::Null), Some(Value::Null));
}
