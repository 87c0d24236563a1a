#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the strand crates.
//!
//! - [`Value`]: the JSON-like result of a translation
//! - [`Colors`]: ANSI palette used when rendering values and traces

mod colors;
mod value;


pub use colors::Colors;
pub use value::Value;
