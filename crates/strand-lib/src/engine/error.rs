//! Errors that can occur during translation.

use std::fmt;

use serde::Serialize;

use crate::grammar::GrammarError;

/// Why a single match attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    LiteralMismatch,
    PatternMismatch,
    /// Pruned for length, or a wildcard sub-grammar stopped short of its span.
    BoundsError,
    /// The grammar matched but input remained.
    IncompleteConsumption,
    TransformFailed,
    /// A client-supplied primitive rejected the text.
    PrimitiveFailed,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MismatchKind::LiteralMismatch => "literal mismatch",
            MismatchKind::PatternMismatch => "pattern mismatch",
            MismatchKind::BoundsError => "out of bounds",
            MismatchKind::IncompleteConsumption => "unconsumed input",
            MismatchKind::TransformFailed => "transform failed",
            MismatchKind::PrimitiveFailed => "primitive failed",
        };
        f.write_str(text)
    }
}

/// What the failed construct was looking for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Expected {
    Literal(String),
    Pattern(String),
    EndOfInput,
    /// At least this many more bytes.
    MinLength(usize),
    /// A sub-grammar consuming its span up to this offset.
    SpanEnd(usize),
    /// A transform accepting the text; carries the transform's message.
    Accepted(String),
    /// A primitive accepting the text.
    Primitive { name: String, message: String },
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(text) => write!(f, "{text:?}"),
            Expected::Pattern(source) => write!(f, "/{source}/"),
            Expected::EndOfInput => f.write_str("end of input"),
            Expected::MinLength(n) => write!(f, "at least {n} more bytes"),
            Expected::SpanEnd(end) => write!(f, "sub-grammar to consume up to {end}"),
            Expected::Accepted(message) => write!(f, "accepted text ({message})"),
            Expected::Primitive { name, message } => write!(f, "%{name} ({message})"),
        }
    }
}

/// Recoverable failure: an enclosing alternative may try its other branch.
///
/// Positions are byte offsets into the top-level input, also for failures
/// inside wildcard sub-grammars.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub kind: MismatchKind,
    pub position: usize,
    pub expected: Vec<Expected>,
    /// Offending text at `position`; `None` at end of input.
    pub found: Option<String>,
}

impl Mismatch {
    pub(crate) fn new(kind: MismatchKind, position: usize, expected: Expected) -> Self {
        Self {
            kind,
            position,
            expected: vec![expected],
            found: None,
        }
    }

    pub(crate) fn found(mut self, found: Option<&str>) -> Self {
        self.found = found.map(str::to_owned);
        self
    }

    /// Keep whichever failure got further into the input. On a tie the
    /// expectations are combined under `other`'s kind.
    pub(crate) fn furthest(self, other: Mismatch) -> Mismatch {
        if self.position > other.position {
            return self;
        }
        if other.position > self.position {
            return other;
        }

        let mut combined = other;
        for expected in self.expected {
            if !combined.expected.contains(&expected) {
                combined.expected.push(expected);
            }
        }
        combined
    }

    /// Expectation and offending text, as shown under the source line.
    pub fn describe(&self) -> String {
        let expected = self
            .expected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        match &self.found {
            Some(found) => format!("expected {expected}, found {found:?}"),
            None => format!("expected {expected}, found end of input"),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.position, self.describe())
    }
}

impl std::error::Error for Mismatch {}

/// Flat classification over every error a translation can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    LiteralMismatch,
    PatternMismatch,
    BoundsError,
    IncompleteConsumption,
    TransformFailed,
    PrimitiveFailed,
    InvalidPattern,
    LeftRecursion,
    ExecFuelExhausted,
    RecursionLimitExceeded,
}

impl From<MismatchKind> for ErrorKind {
    fn from(kind: MismatchKind) -> Self {
        match kind {
            MismatchKind::LiteralMismatch => ErrorKind::LiteralMismatch,
            MismatchKind::PatternMismatch => ErrorKind::PatternMismatch,
            MismatchKind::BoundsError => ErrorKind::BoundsError,
            MismatchKind::IncompleteConsumption => ErrorKind::IncompleteConsumption,
            MismatchKind::TransformFailed => ErrorKind::TransformFailed,
            MismatchKind::PrimitiveFailed => ErrorKind::PrimitiveFailed,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Mismatch(#[from] Mismatch),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// Execution fuel exhausted (too many match attempts).
    #[error("execution limit of {0} attempts exceeded")]
    ExecFuelExhausted(u32),

    /// Recursion fuel exhausted (grammar nested too deeply for the input).
    #[error("recursion limit of {0} exceeded")]
    RecursionLimitExceeded(u32),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Mismatch(m) => m.kind.into(),
            ParseError::Grammar(GrammarError::InvalidPattern { .. }) => ErrorKind::InvalidPattern,
            ParseError::Grammar(GrammarError::LeftRecursion { .. }) => ErrorKind::LeftRecursion,
            ParseError::ExecFuelExhausted(_) => ErrorKind::ExecFuelExhausted,
            ParseError::RecursionLimitExceeded(_) => ErrorKind::RecursionLimitExceeded,
        }
    }

    pub fn as_mismatch(&self) -> Option<&Mismatch> {
        match self {
            ParseError::Mismatch(m) => Some(m),
            _ => None,
        }
    }

    /// Byte offset the error points at, if it has one.
    pub fn position(&self) -> Option<usize> {
        self.as_mismatch().map(|m| m.position)
    }
}
