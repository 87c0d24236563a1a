use serde_json::json;
use strand_core::Value;

use super::*;
use crate::grammar::*;
use crate::seq;

fn letters() -> Expr {
    alternative(
        repeat(pattern("[a-z]").unwrap()),
        empty(Value::empty_array()),
    )
}

#[test]
fn fuel_limits_defaults() {
    let limits = FuelLimits::default();

    assert_eq!(limits.get_exec_fuel(), 1_000_000);
    assert_eq!(limits.get_recursion_limit(), 256);
}

#[test]
fn fuel_limits_builder() {
    let limits = FuelLimits::new().exec_fuel(10).recursion_limit(20);

    assert_eq!(limits.get_exec_fuel(), 10);
    assert_eq!(limits.get_recursion_limit(), 20);

    let translator = Translator::builder().limits(limits).exec_fuel(30).build();
    assert_eq!(translator.limits().get_exec_fuel(), 30);
    assert_eq!(translator.limits().get_recursion_limit(), 20);
}

#[test]
fn exec_fuel_exhausted() {
    let translator = Translator::builder().exec_fuel(5).build();

    let err = translator.translate("abcdefgh", &letters()).unwrap_err();

    assert!(matches!(err, ParseError::ExecFuelExhausted(5)));
    assert_eq!(err.kind(), ErrorKind::ExecFuelExhausted);
    insta::assert_snapshot!(err.to_string(), @"execution limit of 5 attempts exceeded");
}

fn parens() -> Expr {
    alternative(seq!["(", lazy(parens), ")"], nothing())
}

#[test]
fn recursion_limit_exceeded() {
    let translator = Translator::builder().recursion_limit(8).build();

    let err = translator.translate("(((((())))))", &parens()).unwrap_err();

    assert!(matches!(err, ParseError::RecursionLimitExceeded(8)));
    assert_eq!(err.kind(), ErrorKind::RecursionLimitExceeded);
    assert_eq!(err.as_mismatch(), None);
}

#[test]
fn repetition_does_not_nest() {
    let translator = Translator::builder().recursion_limit(8).build();

    let translation = translator.translate("abcdefghijklmnopqrst", &letters()).unwrap();

    assert_eq!(translation.value.unwrap().as_array().map(<[Value]>::len), Some(20));
}

#[test]
fn limits_large_enough_succeed() {
    let translator = Translator::builder()
        .exec_fuel(10_000)
        .recursion_limit(256)
        .build();

    let translation = translator.translate("abcdefghijklmnopqrst", &letters()).unwrap();

    assert_eq!(translation.value.unwrap().as_array().map(<[Value]>::len), Some(20));
}

#[test]
fn error_kinds() {
    let mismatch = translate("abd", &literal("abc")).unwrap_err();
    assert_eq!(mismatch.kind(), ErrorKind::LiteralMismatch);
    assert_eq!(mismatch.position(), Some(2));

    let grammar_error = ParseError::from(pattern("(").unwrap_err());
    assert_eq!(grammar_error.kind(), ErrorKind::InvalidPattern);
    assert_eq!(grammar_error.position(), None);
}

#[test]
fn memo_hits_on_shared_failures() {
    let shared = literal("ab");
    let grammar = alternative(&shared, alternative(&shared, "ac"));

    let translation = translate("ac", &grammar).unwrap();

    assert_eq!(translation.value, None);
    assert_eq!(translation.stats.memo_hits, 1);
}

#[test]
fn memoization_does_not_change_results() {
    let shared = literal("ab");
    let grammars = [
        alternative(&shared, alternative(&shared, "ac")),
        letters(),
        split(","),
        seq![wildcard(), alternative(exists("?"), empty(false)), ": ", wildcard()],
    ];
    let inputs = ["ac", "abc", "1,2,3", "hoge?: x", "hoge: x", "zz"];

    let memoized = Translator::new();
    let plain = Translator::builder().memoize(false).build();

    for grammar in &grammars {
        for input in inputs {
            let a = memoized.translate(input, grammar);
            let b = plain.translate(input, grammar);
            match (a, b) {
                (Ok(a), Ok(b)) => {
                    assert_eq!(a.value, b.value, "{input:?} against {grammar:?}");
                    assert_eq!(a.position, b.position);
                    assert_eq!(b.stats.memo_hits, 0);
                    assert_eq!(b.stats.memo_stores, 0);
                }
                (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
                (a, b) => panic!("{input:?} against {grammar:?}: {a:?} vs {b:?}"),
            }
        }
    }
}

#[test]
fn stats_for_single_literal() {
    let translation = translate("abc", &literal("abc")).unwrap();

    assert_eq!(
        translation.stats,
        SessionStats {
            attempts: 2,
            memo_hits: 0,
            memo_stores: 2,
            pruned: 0,
        }
    );
}

#[test]
fn pruned_attempts_are_counted() {
    let translation = translate("", &letters()).unwrap();

    assert_eq!(translation.stats.pruned, 1);
    assert_eq!(translation.value.unwrap().to_json(), json!([]));
}

#[test]
fn translation_serializes() {
    let grammar = seq![field("name", wildcard())];
    let translation = translate("x", &grammar).unwrap();

    let json = serde_json::to_value(&translation).unwrap();

    assert_eq!(json["value"], json!([{"name": "x"}]));
    assert_eq!(json["position"], json!(1));
    assert!(json["stats"]["attempts"].as_u64().unwrap() > 0);
}

#[test]
fn translate_with_tracer() {
    let mut tracer = PrintTracer::new(Verbosity::Default, strand_core::Colors::OFF);

    let translation = Translator::new()
        .translate_with("ab", &literal("ab"), &mut tracer)
        .unwrap();

    assert_eq!(translation.position, 2);
    assert_eq!(tracer.lines().len(), 2);
}
