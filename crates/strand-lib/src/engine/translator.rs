//! Entry points: limits, the configured translator, and the result type.

use serde::Serialize;
use strand_core::Value;

use crate::grammar::{Expr, check_left_recursion};

use super::error::ParseError;
use super::session::Session;
use super::trace::{NoopTracer, Tracer};

/// Runtime limits for translation.
#[derive(Clone, Copy, Debug)]
pub struct FuelLimits {
    /// Maximum total match attempts (default: 1,000,000).
    pub(crate) exec_fuel: u32,
    /// Maximum attempt nesting depth (default: 256). Each level holds a few
    /// engine frames on the native stack; the default stays well inside a
    /// 2 MiB thread stack in unoptimized builds.
    pub(crate) recursion_limit: u32,
}

impl Default for FuelLimits {
    fn default() -> Self {
        Self {
            exec_fuel: 1_000_000,
            recursion_limit: 256,
        }
    }
}

impl FuelLimits {
    /// Create new fuel limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution fuel limit.
    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.exec_fuel = fuel;
        self
    }

    /// Set the recursion limit.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn get_exec_fuel(&self) -> u32 {
        self.exec_fuel
    }
    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }
}

/// Counters over one translation, sub-parses included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Attempts that consumed fuel.
    pub attempts: u32,
    pub memo_hits: u32,
    pub memo_stores: u32,
    /// Attempts rejected because the remaining input was too short.
    pub pruned: u32,
}

/// Fuel and depth shared by a session and its sub-sessions.
pub(crate) struct Budget {
    limits: FuelLimits,
    fuel: u32,
    pub(crate) depth: u32,
    pub(crate) stats: SessionStats,
}

impl Budget {
    pub(crate) fn new(limits: FuelLimits) -> Self {
        Self {
            limits,
            fuel: limits.exec_fuel,
            depth: 0,
            stats: SessionStats::default(),
        }
    }

    /// Pay for one attempt.
    pub(crate) fn step(&mut self) -> Result<(), ParseError> {
        if self.fuel == 0 {
            return Err(ParseError::ExecFuelExhausted(self.limits.exec_fuel));
        }
        self.fuel -= 1;
        self.stats.attempts += 1;
        Ok(())
    }

    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.limits.recursion_limit {
            return Err(ParseError::RecursionLimitExceeded(self.limits.recursion_limit));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.ensure_depth_taken();
        self.depth -= 1;
    }
}

/// Successful translation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Translation {
    /// The grammar's value; `None` for grammars that yield nothing
    /// (a bare literal).
    pub value: Option<Value>,
    /// Always the input length.
    pub position: usize,
    pub stats: SessionStats,
}

/// Configured translator.
#[derive(Clone, Copy, Debug)]
pub struct Translator {
    limits: FuelLimits,
    memoize: bool,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            limits: FuelLimits::default(),
            memoize: true,
        }
    }
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }

    pub fn limits(&self) -> FuelLimits {
        self.limits
    }

    /// Match `grammar` against the whole of `input`.
    pub fn translate(&self, input: &str, grammar: &Expr) -> Result<Translation, ParseError> {
        self.translate_with(input, grammar, &mut NoopTracer)
    }

    /// Like [`translate`](Self::translate), reporting every step to `tracer`.
    pub fn translate_with<T: Tracer>(
        &self,
        input: &str,
        grammar: &Expr,
        tracer: &mut T,
    ) -> Result<Translation, ParseError> {
        check_left_recursion(grammar, self.limits.recursion_limit as usize)?;

        let mut budget = Budget::new(self.limits);
        let matched = {
            let mut session = Session::new(input, 0, self.memoize, &mut budget, tracer);
            session.run(grammar)?
        };

        Ok(Translation {
            value: matched.value,
            position: matched.end,
            stats: budget.stats,
        })
    }
}

/// Builder for [`Translator`].
pub struct TranslatorBuilder {
    limits: FuelLimits,
    memoize: bool,
}

impl TranslatorBuilder {
    pub fn new() -> Self {
        Self {
            limits: FuelLimits::default(),
            memoize: true,
        }
    }

    /// Set all fuel limits at once.
    pub fn limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.limits = self.limits.exec_fuel(fuel);
        self
    }

    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.limits = self.limits.recursion_limit(limit);
        self
    }

    /// Toggle the packrat cache. Results are identical either way.
    pub fn memoize(mut self, enabled: bool) -> Self {
        self.memoize = enabled;
        self
    }

    pub fn build(self) -> Translator {
        Translator {
            limits: self.limits,
            memoize: self.memoize,
        }
    }
}

impl Default for TranslatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate with default limits.
pub fn translate(input: &str, grammar: &Expr) -> Result<Translation, ParseError> {
    Translator::default().translate(input, grammar)
}
