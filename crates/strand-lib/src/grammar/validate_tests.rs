use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::seq;

/// Build a rule that refers to itself through a lazy node returning the
/// very same node (not a fresh copy).
fn recursive(build: impl FnOnce(Expr) -> Expr) -> Expr {
    let slot: Rc<RefCell<Option<Expr>>> = Rc::default();
    let handle = slot.clone();
    let this = lazy(move || handle.borrow().clone().unwrap_or_else(end));
    let rule = build(this);
    *slot.borrow_mut() = Some(rule.clone());
    rule
}

fn fresh_left_recursive() -> Expr {
    alternative(seq![lazy(fresh_left_recursive), "+", "1"], "1")
}

#[test]
fn accepts_repeat() {
    assert_eq!(check_left_recursion(&repeat("a"), 64), Ok(()));
}

#[test]
fn accepts_recursion_after_consuming_input() {
    let rule = recursive(|this| alternative(seq!["(", this, ")"], nothing()));

    assert_eq!(check_left_recursion(&rule, 64), Ok(()));
}

#[test]
fn rejects_direct_left_recursion() {
    let rule = recursive(|this| seq![this, "x"]);

    let err = check_left_recursion(&rule, 64).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"left recursion: `(@lazy "x")` can reach itself without consuming input"#
    );
}

#[test]
fn rejects_recursion_behind_nullable_prefix() {
    let rule = recursive(|this| seq![alternative("a", nothing()), this, "x"]);

    assert!(matches!(
        check_left_recursion(&rule, 64),
        Err(GrammarError::LeftRecursion { .. })
    ));
}

#[test]
fn rejects_left_recursion_through_fresh_nodes() {
    assert!(matches!(
        check_left_recursion(&fresh_left_recursive(), 64),
        Err(GrammarError::LeftRecursion { .. })
    ));
}

#[test]
fn wildcard_sub_grammars_are_checked() {
    let inner = recursive(|this| seq![this, "x"]);
    let outer = seq!["(", wildcard_with(inner), ")"];

    assert!(check_left_recursion(&outer, 64).is_err());
}

#[test]
fn shared_subtrees_are_checked_once() {
    let word = pattern("[a-z]+").unwrap();
    let grammar = seq![&word, " ", alternative(&word, seq![&word, "!"])];

    assert_eq!(check_left_recursion(&grammar, 64), Ok(()));
}

#[test]
fn rejects_repeat_of_nullable_item() {
    let err = check_left_recursion(&repeat(alternative("a", nothing())), 64).unwrap_err();

    assert!(matches!(err, GrammarError::LeftRecursion { .. }));
}

#[test]
fn nullable_primitive_does_not_guard_recursion() {
    let rule = recursive(|this| alternative(seq![integer(), this, "x"], "x"));

    assert!(check_left_recursion(&rule, 64).is_err());
}
