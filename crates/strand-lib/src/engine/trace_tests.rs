use strand_core::Colors;

use super::*;
use crate::grammar::*;
use crate::seq;

fn trace(input: &str, grammar: &Expr, verbosity: Verbosity) -> String {
    let mut tracer = PrintTracer::new(verbosity, Colors::OFF);
    let _ = Translator::new().translate_with(input, grammar, &mut tracer);
    tracer.render()
}

#[test]
fn default_shows_results_and_fallbacks() {
    let grammar = seq!["a", alternative("b", "c")];

    insta::assert_snapshot!(trace("ac", &grammar, Verbosity::Default), @r#"
      ● 0..1 "a"
        ○ 1 "b": literal mismatch
        ↺ 1 ("b" | "c")
        ● 1..2 "c"
      ● 1..2 ("b" | "c")
    ● 0..2 ("a" ("b" | "c"))
    ● 2..2 $
    "#);
}

#[test]
fn verbose_shows_attempts() {
    insta::assert_snapshot!(trace("ab", &literal("ab"), Verbosity::Verbose), @r#"
    → 0 "ab"
    ● 0..2 "ab"
    → 2 $
    ● 2..2 $
    "#);
}

#[test]
fn very_verbose_shows_values() {
    let grammar = pattern("[a-z]+").unwrap();

    insta::assert_snapshot!(trace("ab", &grammar, Verbosity::VeryVerbose), @r#"
    → 0 /[a-z]+/
    ● 0..2 /[a-z]+/ = "ab"
    → 2 $
    ● 2..2 $
    "#);
}

#[test]
fn verbose_shows_memo_hits() {
    let shared = literal("ab");
    let grammar = alternative(&shared, alternative(&shared, "ac"));

    insta::assert_snapshot!(trace("ac", &grammar, Verbosity::Verbose), @r#"
    → 0 ("ab" | ("ab" | "ac"))
      → 0 "ab"
      ○ 0 "ab": literal mismatch
      ↺ 0 ("ab" | ("ab" | "ac"))
      → 0 ("ab" | "ac")
        ≡ 0 "ab" hit (failure)
        ↺ 0 ("ab" | "ac")
        → 0 "ac"
        ● 0..2 "ac"
      ● 0..2 ("ab" | "ac")
    ● 0..2 ("ab" | ("ab" | "ac"))
    → 2 $
    ● 2..2 $
    "#);
}

#[test]
fn prune_is_verbose_only() {
    let grammar = literal("abcd");

    insta::assert_snapshot!(trace("abc", &grammar, Verbosity::Verbose), @r#"✂ 0 "abcd" needs 4"#);
    assert_eq!(trace("abc", &grammar, Verbosity::Default), "");
}

#[test]
fn sub_parses_are_nested() {
    let grammar = seq![wildcard_with("ab")];

    insta::assert_snapshot!(trace("ab", &grammar, Verbosity::Default), @r#"
        ⤵ 0..2 "ab"
          ● 0..2 "ab"
          ● 2..2 $
        ⤴ ok
      ● 0..2 *<"ab">
    ● 0..2 (*<"ab">)
    ● 2..2 $
    "#);
}

#[test]
fn long_expressions_are_truncated() {
    let grammar = literal("x".repeat(60));
    let input = "x".repeat(60);

    let rendered = trace(&input, &grammar, Verbosity::Default);
    let first = rendered.lines().next().unwrap();

    assert!(first.ends_with('…'), "{first}");
    assert_eq!(first.trim_start_matches("● 0..60 ").chars().count(), 48);
}

#[test]
fn colors_wrap_expressions() {
    let mut tracer = PrintTracer::new(Verbosity::Default, Colors::ON);
    let _ = Translator::new().translate_with("ab", &literal("ab"), &mut tracer);

    assert!(tracer.lines()[0].contains("\x1b[34m"), "{:?}", tracer.lines());
}

#[test]
fn noop_tracer_matches_plain_translate() {
    let grammar = seq![wildcard(), " ", wildcard()];

    let traced = Translator::new()
        .translate_with("hello world", &grammar, &mut NoopTracer)
        .unwrap();
    let plain = translate("hello world", &grammar).unwrap();

    assert_eq!(traced, plain);
}

fn parens() -> Expr {
    alternative(seq!["(", lazy(parens), ")"], nothing())
}

#[test]
fn fatal_errors_close_open_attempts() {
    let mut tracer = PrintTracer::new(Verbosity::Verbose, Colors::OFF);
    let limited = Translator::builder().recursion_limit(3).build();

    let err = limited
        .translate_with("(())", &parens(), &mut tracer)
        .unwrap_err();
    assert!(matches!(err, ParseError::RecursionLimitExceeded(3)));

    Translator::new()
        .translate_with("ab", &literal("ab"), &mut tracer)
        .unwrap();

    insta::assert_snapshot!(tracer.render(), @r#"
    → 0 (("(" @lazy ")") | nothing)
      → 0 ("(" @lazy ")")
        → 0 "("
        ● 0..1 "("
        → 1 @lazy
        ✗ 1 @lazy: recursion limit of 3 exceeded
      ✗ 0 ("(" @lazy ")"): recursion limit of 3 exceeded
    ✗ 0 (("(" @lazy ")") | nothing): recursion limit of 3 exceeded
    → 0 "ab"
    ● 0..2 "ab"
    → 2 $
    ● 2..2 $
    "#);
}
