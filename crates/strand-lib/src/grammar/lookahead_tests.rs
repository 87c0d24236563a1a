use strand_core::Value;

use super::*;
use crate::seq;

fn render(expr: &Expr) -> String {
    let mut lookahead = Lookahead::new();
    let info = lookahead.info(expr);
    let heads: Vec<String> = info
        .heads
        .iter()
        .map(|head| match head {
            Head::Literal(text) => format!("{text:?}"),
            Head::Pattern(p) => format!("/{}/", p.as_str()),
            Head::Unknown => "?".to_owned(),
            Head::Transparent => "~".to_owned(),
        })
        .collect();
    format!("{} min={}", heads.join(" "), info.min_len)
}

#[test]
fn literal_reports_itself() {
    insta::assert_snapshot!(render(&literal("abc")), @r#""abc" min=3"#);
}

#[test]
fn sequence_merges_literal_heads() {
    let expr = seq!["a", alternative("b", "c")];

    insta::assert_snapshot!(render(&expr), @r#""ab" "ac" min=2"#);
}

#[test]
fn sequence_keeps_first_literal_when_next_is_not_literal() {
    insta::assert_snapshot!(render(&seq!["a", wildcard()]), @r#""a" min=1"#);
    insta::assert_snapshot!(
        render(&seq!["a", alternative("b", nothing())]),
        @r#""a" min=1"#
    );
}

#[test]
fn alternative_reports_both_branches() {
    let expr = alternative("x", pattern("[0-9]+").unwrap());

    insta::assert_snapshot!(render(&expr), @r#""x" /[0-9]+/ min=1"#);
}

#[test]
fn zero_width_nodes_are_transparent() {
    insta::assert_snapshot!(render(&seq![nothing(), "x"]), @r#""x" min=1"#);
    insta::assert_snapshot!(
        render(&alternative(exists("?"), empty(false))),
        @r#""?" ~ min=0"#
    );
    insta::assert_snapshot!(render(&seq![empty(Value::Null)]), @"~ min=0");
}

#[test]
fn open_ended_nodes_are_unknown() {
    insta::assert_snapshot!(render(&wildcard()), @"? min=0");
    insta::assert_snapshot!(render(&end()), @"? min=0");
    insta::assert_snapshot!(
        render(&function_match(|text: &str| Ok::<_, String>(Value::from(text)))),
        @"? min=0"
    );
}

#[test]
fn min_len_sums_sequences_and_takes_minimum_of_choices() {
    let expr = seq![pattern(r"\d{3}").unwrap(), "-", wildcard()];
    insta::assert_snapshot!(render(&expr), @r"/\d{3}/ min=4");

    insta::assert_snapshot!(render(&alternative("abc", "d")), @r#""abc" "d" min=1"#);
}

#[test]
fn wildcard_with_sub_grammar_delegates() {
    let expr = wildcard_with(seq!["[", wildcard()]);

    insta::assert_snapshot!(render(&expr), @r#""[" min=1"#);
}

#[test]
fn repeat_cycle_is_cut() {
    insta::assert_snapshot!(render(&repeat("ab")), @r#""ab" min=2"#);
}

fn nested() -> Expr {
    alternative(seq!["(", lazy(nested), ")"], nothing())
}

#[test]
fn fresh_lazy_nodes_are_bounded() {
    insta::assert_snapshot!(render(&nested()), @r#""(" ~ min=0"#);
}

#[test]
fn results_are_cached_per_node() {
    let expr = seq!["a", wildcard()];
    let mut lookahead = Lookahead::new();

    let first = lookahead.heads(&expr);
    let second = lookahead.heads(&expr);
    assert!(std::rc::Rc::ptr_eq(&first, &second));
}

struct Keyword;

impl Primitive for Keyword {
    fn name(&self) -> &str {
        "keyword"
    }

    fn parse(&self, input: &str, pos: usize) -> Result<(Option<Value>, usize), String> {
        let end = if input[pos..].starts_with("let") { pos + 3 } else { pos };
        Ok((None, end))
    }

    fn heads(&self) -> Vec<Head> {
        vec![Head::Literal("let".to_owned()), Head::Transparent]
    }
}

#[test]
fn primitives_report_their_own_heads() {
    insta::assert_snapshot!(render(&primitive(Keyword)), @r#""let" ~ min=0"#);
    insta::assert_snapshot!(render(&seq![primitive(Keyword), "="]), @r#""let" "=" min=1"#);
    insta::assert_snapshot!(render(&integer()), @"? min=0");
    insta::assert_snapshot!(render(&end_with(1_i64)), @"? min=0");
}
