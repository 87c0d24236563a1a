//! Grammar combinators.
//!
//! Every function returns a fresh node. Plain strings convert into literals
//! wherever an `impl Into<Expr>` is accepted.

use std::fmt::Display;
use std::rc::Rc;

use strand_core::Value;

use super::error::GrammarError;
use super::node::{Expr, NodeKind, Pattern, Primitive, Resolver, Transform};

pub fn literal(text: impl Into<String>) -> Expr {
    Expr::new(NodeKind::Literal(text.into()))
}

/// Anchored regex match. Fails at construction if the regex does not compile.
pub fn pattern(source: &str) -> Result<Expr, GrammarError> {
    Ok(Expr::new(NodeKind::Pattern(Pattern::new(source)?)))
}

/// Concatenation.
///
/// Adjacent literals are merged into one and empty literals are dropped, so
/// `sequence(["a", "", "b"])` is the single literal child `"ab"`.
pub fn sequence<I, P>(parts: I) -> Expr
where
    I: IntoIterator<Item = P>,
    P: Into<Expr>,
{
    let mut children: Vec<Expr> = Vec::new();

    for part in parts {
        let part = part.into();
        let Some(text) = part.as_literal() else {
            children.push(part);
            continue;
        };
        if text.is_empty() {
            continue;
        }
        match children.last().and_then(Expr::as_literal) {
            Some(prev) => {
                let merged = literal(format!("{prev}{text}"));
                children.pop();
                children.push(merged);
            }
            None => children.push(part),
        }
    }

    Expr::new(NodeKind::Sequence(children))
}

/// Ordered choice: `second` is tried only if `first` fails.
pub fn alternative(first: impl Into<Expr>, second: impl Into<Expr>) -> Expr {
    Expr::new(NodeKind::Alternative(first.into(), second.into()))
}

/// Deferred reference, for recursive grammars.
pub fn lazy<F>(resolve: F) -> Expr
where
    F: Fn() -> Expr + 'static,
{
    Expr::new(NodeKind::Lazy(Resolver::new(resolve)))
}

pub fn flatten(node: impl Into<Expr>) -> Expr {
    Expr::new(NodeKind::Flatten(node.into()))
}

pub fn reduce(node: impl Into<Expr>) -> Expr {
    Expr::new(NodeKind::Reduce(node.into()))
}

/// Consume everything up to where the following grammar can begin.
pub fn wildcard() -> Expr {
    Expr::new(NodeKind::Wildcard(None))
}

/// Like [`wildcard`], then parse the consumed span with `sub`.
pub fn wildcard_with(sub: impl Into<Expr>) -> Expr {
    Expr::new(NodeKind::Wildcard(Some(sub.into())))
}

pub fn exists(target: impl Into<String>) -> Expr {
    Expr::new(NodeKind::Exists(target.into()))
}

/// Object field `{key: value-of-node}`.
pub fn field(key: impl Into<String>, node: impl Into<Expr>) -> Expr {
    Expr::new(NodeKind::Field(key.into(), node.into()))
}

/// Consume the rest of the input and convert it with `transform`.
///
/// An `Err` from the transform is a match failure carrying its message.
pub fn function_match<F, E>(transform: F) -> Expr
where
    F: Fn(&str) -> Result<Value, E> + 'static,
    E: Display,
{
    Expr::new(NodeKind::FunctionMatch(Transform::new(move |text| {
        transform(text).map_err(|e| e.to_string())
    })))
}

/// Zero-width match yielding `value`.
pub fn empty(value: impl Into<Value>) -> Expr {
    Expr::new(NodeKind::Empty(Some(value.into())))
}

/// Zero-width match yielding no value.
pub fn nothing() -> Expr {
    Expr::new(NodeKind::Empty(None))
}

pub fn end() -> Expr {
    Expr::new(NodeKind::End(None))
}

/// Like [`end`], yielding `value`.
pub fn end_with(value: impl Into<Value>) -> Expr {
    Expr::new(NodeKind::End(Some(value.into())))
}

/// Wrap a client-supplied terminal parser.
pub fn primitive(parser: impl Primitive + 'static) -> Expr {
    Expr::new(NodeKind::Primitive(Rc::new(parser)))
}

/// Run of ASCII digits, yielded as text. Matches an empty run too.
pub fn integer() -> Expr {
    primitive(Integer)
}

struct Integer;

impl Primitive for Integer {
    fn name(&self) -> &str {
        "integer"
    }

    fn parse(&self, input: &str, pos: usize) -> Result<(Option<Value>, usize), String> {
        let digits = input[pos..].bytes().take_while(u8::is_ascii_digit).count();
        let end = pos + digits;
        Ok((Some(Value::String(input[pos..end].to_owned())), end))
    }
}

/// One or more `node`, spliced into a flat array.
///
/// Shaped as `...(...node ...(@lazy | empty([])))` with the lazy tail
/// referring back to the returned node. Evaluation loops over the items, so
/// long repetitions neither nest nor copy their tails.
pub fn repeat(node: impl Into<Expr>) -> Expr {
    let node = node.into();
    Expr::cyclic(|this| {
        let this = this.clone();
        let item = node.clone();
        let tail = lazy(move || Expr::from_weak(&this).unwrap_or_else(|| repeat(item.clone())));
        NodeKind::Repeat([
            flatten(node),
            flatten(alternative(tail, empty(Value::empty_array()))),
        ])
    })
}

/// Items separated by `delimiter`, each item taken by a wildcard.
pub fn split(delimiter: impl Into<String>) -> Expr {
    split_items(delimiter.into(), None)
}

/// Like [`split`], parsing each item with `item`.
pub fn split_with(delimiter: impl Into<String>, item: impl Into<Expr>) -> Expr {
    split_items(delimiter.into(), Some(item.into()))
}

fn split_items(delimiter: String, item: Option<Expr>) -> Expr {
    let element = || Expr::new(NodeKind::Wildcard(item.clone()));
    let rest = alternative(
        repeat(sequence([literal(delimiter), element()])),
        empty(Value::empty_array()),
    );
    flatten(wildcard_with(sequence([element(), flatten(rest)])))
}
