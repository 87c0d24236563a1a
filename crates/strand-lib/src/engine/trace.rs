//! Tracing infrastructure for debugging translation.
//!
//! The engine is generic over [`Tracer`]. With [`NoopTracer`] every hook is an
//! `#[inline(always)]` empty function and the calls compile away. Display
//! state (nesting depth) lives in the tracer, never in the session.

use strand_core::{Colors, Value};

use crate::grammar::Expr;

use super::error::{Mismatch, ParseError};

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Results only: success, failure, fallback, sub-parses.
    #[default]
    Default,
    /// Also attempts, memo hits, prunes and aborts.
    Verbose,
    /// Everything, with values on success lines.
    VeryVerbose,
}

/// Hooks called by the engine at fixed points of an attempt.
///
/// An attempt is either short-circuited (`trace_pruned`, `trace_memo_hit`)
/// or opened by `trace_attempt` and closed by exactly one of
/// `trace_success`/`trace_failure`/`trace_abort`.
pub trait Tracer {
    fn trace_attempt(&mut self, expr: &Expr, pos: usize);

    fn trace_success(&mut self, expr: &Expr, pos: usize, end: usize, value: Option<&Value>);

    fn trace_failure(&mut self, expr: &Expr, pos: usize, mismatch: &Mismatch);

    /// Fuel ran out below the attempt; the translation stops.
    fn trace_abort(&mut self, expr: &Expr, pos: usize, error: &ParseError);

    /// Cached outcome reused without evaluation.
    fn trace_memo_hit(&mut self, expr: &Expr, pos: usize, success: bool);

    /// Remaining input shorter than `needed` bytes.
    fn trace_pruned(&mut self, expr: &Expr, pos: usize, needed: usize);

    /// First branch of an alternative failed, second is tried next.
    fn trace_fallback(&mut self, expr: &Expr, pos: usize);

    fn trace_enter_subparse(&mut self, sub: &Expr, start: usize, end: usize);

    fn trace_exit_subparse(&mut self, success: bool);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_attempt(&mut self, _expr: &Expr, _pos: usize) {}

    #[inline(always)]
    fn trace_success(&mut self, _expr: &Expr, _pos: usize, _end: usize, _value: Option<&Value>) {}

    #[inline(always)]
    fn trace_failure(&mut self, _expr: &Expr, _pos: usize, _mismatch: &Mismatch) {}

    #[inline(always)]
    fn trace_abort(&mut self, _expr: &Expr, _pos: usize, _error: &ParseError) {}

    #[inline(always)]
    fn trace_memo_hit(&mut self, _expr: &Expr, _pos: usize, _success: bool) {}

    #[inline(always)]
    fn trace_pruned(&mut self, _expr: &Expr, _pos: usize, _needed: usize) {}

    #[inline(always)]
    fn trace_fallback(&mut self, _expr: &Expr, _pos: usize) {}

    #[inline(always)]
    fn trace_enter_subparse(&mut self, _sub: &Expr, _start: usize, _end: usize) {}

    #[inline(always)]
    fn trace_exit_subparse(&mut self, _success: bool) {}
}

/// Widest grammar notation shown on one line.
const EXPR_WIDTH: usize = 48;

/// Collects an indented, human-readable trace.
pub struct PrintTracer {
    verbosity: Verbosity,
    colors: Colors,
    lines: Vec<String>,
    depth: usize,
}

impl PrintTracer {
    pub fn new(verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            verbosity,
            colors,
            lines: Vec::new(),
            depth: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with newlines.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn verbose(&self) -> bool {
        self.verbosity != Verbosity::Default
    }

    fn push(&mut self, symbol: &str, content: String) {
        let indent = "  ".repeat(self.depth);
        self.lines.push(format!("{indent}{symbol} {content}"));
    }

    fn format_expr(&self, expr: &Expr) -> String {
        let c = &self.colors;
        let text = truncate_text(&format!("{expr:?}"), EXPR_WIDTH);
        format!("{}{}{}", c.blue, text, c.reset)
    }
}

impl Tracer for PrintTracer {
    fn trace_attempt(&mut self, expr: &Expr, pos: usize) {
        if self.verbose() {
            let content = format!("{pos} {}", self.format_expr(expr));
            self.push("→", content);
        }
        self.depth += 1;
    }

    fn trace_success(&mut self, expr: &Expr, pos: usize, end: usize, value: Option<&Value>) {
        self.depth = self.depth.saturating_sub(1);
        let mut content = format!("{pos}..{end} {}", self.format_expr(expr));
        if self.verbosity == Verbosity::VeryVerbose
            && let Some(value) = value
        {
            content.push_str(" = ");
            content.push_str(&value.format(false, self.colors));
        }
        self.push("●", content);
    }

    fn trace_failure(&mut self, expr: &Expr, pos: usize, mismatch: &Mismatch) {
        self.depth = self.depth.saturating_sub(1);
        let c = self.colors;
        let content = format!(
            "{pos} {}: {}{}{}",
            self.format_expr(expr),
            c.dim,
            mismatch.kind,
            c.reset
        );
        self.push("○", content);
    }

    fn trace_abort(&mut self, expr: &Expr, pos: usize, error: &ParseError) {
        self.depth = self.depth.saturating_sub(1);
        if self.verbose() {
            let c = self.colors;
            let content = format!("{pos} {}: {}{error}{}", self.format_expr(expr), c.dim, c.reset);
            self.push("✗", content);
        }
    }

    fn trace_memo_hit(&mut self, expr: &Expr, pos: usize, success: bool) {
        if self.verbose() {
            let outcome = if success { "hit" } else { "hit (failure)" };
            let content = format!("{pos} {} {outcome}", self.format_expr(expr));
            self.push("≡", content);
        }
    }

    fn trace_pruned(&mut self, expr: &Expr, pos: usize, needed: usize) {
        if self.verbose() {
            let content = format!("{pos} {} needs {needed}", self.format_expr(expr));
            self.push("✂", content);
        }
    }

    fn trace_fallback(&mut self, expr: &Expr, pos: usize) {
        let content = format!("{pos} {}", self.format_expr(expr));
        self.push("↺", content);
    }

    fn trace_enter_subparse(&mut self, sub: &Expr, start: usize, end: usize) {
        let content = format!("{start}..{end} {}", self.format_expr(sub));
        self.push("⤵", content);
        self.depth += 1;
    }

    fn trace_exit_subparse(&mut self, success: bool) {
        self.depth = self.depth.saturating_sub(1);
        let outcome = if success { "ok" } else { "failed" };
        self.push("⤴", outcome.to_owned());
    }
}

/// Truncate text to max length with ellipsis.
fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}
