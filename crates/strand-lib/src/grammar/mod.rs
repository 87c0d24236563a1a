//! Grammar algebra: nodes, combinators, static lookahead, validation.

mod build;
mod error;
mod lookahead;
mod node;
mod validate;

#[cfg(test)]
mod lookahead_tests;
#[cfg(test)]
mod validate_tests;

pub use build::{
    alternative, empty, end, end_with, exists, field, flatten, function_match, integer, lazy,
    literal, nothing, pattern, primitive, reduce, repeat, sequence, split, split_with, wildcard,
    wildcard_with,
};
pub use error::GrammarError;
pub use lookahead::{Head, Lookahead, LookaheadInfo};
pub use node::{Expr, Node, NodeId, NodeKind, Pattern, Primitive, Resolver, Transform};
pub use validate::check_left_recursion;
