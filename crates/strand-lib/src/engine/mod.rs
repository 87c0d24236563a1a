//! Translation engine: sessions, continuations, memoization, value assembly.

mod assemble;
mod continuation;
mod error;
mod invariants;
mod memo;
mod printer;
mod session;
mod trace;
mod translator;

#[cfg(test)]
mod assemble_tests;
#[cfg(test)]
mod trace_tests;
#[cfg(test)]
mod translator_tests;

pub use error::{ErrorKind, Expected, Mismatch, MismatchKind, ParseError};
pub use printer::ErrorPrinter;
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use translator::{
    FuelLimits, SessionStats, Translation, Translator, TranslatorBuilder, translate,
};
