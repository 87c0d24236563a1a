//! Strand: text-to-structure translation with parser combinators.
//!
//! A grammar is built from combinators and matched against the whole input.
//! Wildcards stop where the rest of the grammar can begin, so most grammars
//! read like templates of the text they accept.
//!
//! # Example
//!
//! ```
//! use strand_lib::grammar::{field, pattern, wildcard};
//! use strand_lib::{seq, translate};
//!
//! let grammar = seq![
//!     "const ",
//!     field("name", pattern(r"[^\s]+").expect("valid regex")),
//!     " = '",
//!     field("value", wildcard()),
//!     "'",
//! ];
//!
//! let translation = translate("const hoge = 'piyo'", &grammar).expect("input matches");
//! let value = translation.value.expect("sequence has a value");
//! assert_eq!(value.to_json(), serde_json::json!([{"name": "hoge", "value": "piyo"}]));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;
pub mod grammar;

pub use engine::{
    ErrorKind, ErrorPrinter, FuelLimits, Mismatch, NoopTracer, ParseError, PrintTracer,
    Translation, Translator, translate,
};
pub use grammar::{Expr, GrammarError};
pub use strand_core::{Colors, Value};

/// Result type for translation.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Build a sequence from heterogeneous parts; strings become literals.
///
/// ```
/// use strand_lib::grammar::wildcard;
/// use strand_lib::seq;
///
/// let quoted = seq!["'", wildcard(), "'"];
/// # let _ = quoted;
/// ```
#[macro_export]
macro_rules! seq {
    ($($part:expr),* $(,)?) => {
        $crate::grammar::sequence([$($crate::grammar::Expr::from($part)),*])
    };
}
