//! One parse session: a single input, its memo, continuations and lookahead.
//!
//! `attempt(node, pos, cont)` is the whole engine. Continuations tell a
//! wildcard where to stop and let pruning reject attempts the remaining input
//! cannot satisfy. Positions handed out (errors, trace) are offsets into the
//! top-level input; `offset` is where this session's slice starts in it.

use std::collections::HashMap;
use std::rc::Rc;

use strand_core::Value;

use crate::grammar::{Expr, Head, Lookahead, NodeKind, Pattern, Primitive, end};

use super::assemble::{Assembly, reduce, splice};
use super::continuation::{ContId, Continuations};
use super::error::{Expected, Mismatch, MismatchKind, ParseError};
use super::memo::{Matched, Memo, MemoKey};
use super::trace::Tracer;
use super::translator::Budget;

pub(crate) struct Session<'s, 'b, T: Tracer> {
    input: &'s str,
    offset: usize,
    memoize: bool,
    memo: Memo,
    conts: Continuations,
    lookahead: Lookahead,
    cont_heads: HashMap<Option<ContId>, Rc<[Head]>>,
    budget: &'b mut Budget,
    tracer: &'b mut T,
}

impl<'s, 'b, T: Tracer> Session<'s, 'b, T> {
    pub(crate) fn new(
        input: &'s str,
        offset: usize,
        memoize: bool,
        budget: &'b mut Budget,
        tracer: &'b mut T,
    ) -> Self {
        Self {
            input,
            offset,
            memoize,
            memo: Memo::new(),
            conts: Continuations::new(),
            lookahead: Lookahead::new(),
            cont_heads: HashMap::new(),
            budget,
            tracer,
        }
    }

    /// Match `root` against the whole input.
    pub(crate) fn run(&mut self, root: &Expr) -> Result<Matched, ParseError> {
        let end = end();
        let cont = self.conts.intern(&end, None, 0);

        let matched = self.attempt(root, 0, Some(cont))?;
        self.attempt(&end, matched.end, None)?;
        Ok(matched)
    }

    fn attempt(
        &mut self,
        expr: &Expr,
        pos: usize,
        cont: Option<ContId>,
    ) -> Result<Matched, ParseError> {
        self.budget.step()?;
        let at = self.abs(pos);

        let needed = self.lookahead.min_len(expr) + self.conts.min_len(cont);
        if pos + needed > self.input.len() {
            return Err(self.prune(expr, pos, needed).into());
        }

        let key = MemoKey {
            node: expr.id(),
            position: pos,
            cont,
        };
        if self.memoize
            && let Some(entry) = self.memo.get(&key)
        {
            self.budget.stats.memo_hits += 1;
            self.tracer.trace_memo_hit(expr, at, entry.is_ok());
            return entry.clone().map_err(ParseError::from);
        }

        self.budget.enter()?;
        self.tracer.trace_attempt(expr, at);
        let result = self.evaluate(expr, pos, cont);
        self.budget.exit();

        match &result {
            Ok(m) => {
                let end = self.abs(m.end);
                self.tracer.trace_success(expr, at, end, m.value.as_ref());
                self.store(key, Ok(m.clone()));
            }
            Err(ParseError::Mismatch(m)) => {
                self.tracer.trace_failure(expr, at, m);
                self.store(key, Err(m.clone()));
            }
            Err(e) => self.tracer.trace_abort(expr, at, e),
        }
        result
    }

    /// Count and trace an attempt the remaining input is too short for.
    fn prune(&mut self, expr: &Expr, pos: usize, needed: usize) -> Mismatch {
        self.budget.stats.pruned += 1;
        self.tracer.trace_pruned(expr, self.abs(pos), needed);
        self.mismatch(MismatchKind::BoundsError, pos, Expected::MinLength(needed))
    }

    fn store(&mut self, key: MemoKey, entry: Result<Matched, Mismatch>) {
        if self.memoize {
            self.budget.stats.memo_stores += 1;
            self.memo.insert(key, entry);
        }
    }

    fn evaluate(
        &mut self,
        expr: &Expr,
        pos: usize,
        cont: Option<ContId>,
    ) -> Result<Matched, ParseError> {
        if let Some(result) = self.match_terminal(expr.kind(), pos) {
            return result.map_err(ParseError::from);
        }

        match expr.kind() {
            NodeKind::Sequence(children) => self.match_sequence(children, pos, cont),
            NodeKind::Repeat([item, rest]) => self.match_repeat(item, rest, pos, cont),
            NodeKind::Alternative(first, second) => {
                self.match_alternative(expr, first, second, pos, cont)
            }
            NodeKind::Lazy(resolver) => self.attempt(&resolver.resolve(), pos, cont),
            NodeKind::Flatten(child) => self.attempt(child, pos, cont).map(|m| m.spread(true)),
            NodeKind::Reduce(child) => {
                let m = self.attempt(child, pos, cont)?;
                Ok(Matched::new(m.value.and_then(reduce), m.end))
            }
            NodeKind::Field(key, child) => {
                let m = self.attempt(child, pos, cont)?;
                let value = Value::singleton(key.as_str(), m.value.unwrap_or_default());
                Ok(Matched::new(Some(value), m.end))
            }
            NodeKind::Wildcard(sub) => self.match_wildcard(sub.as_ref(), pos, cont),
            NodeKind::Literal(_)
            | NodeKind::Exists(_)
            | NodeKind::Pattern(_)
            | NodeKind::FunctionMatch(_)
            | NodeKind::Primitive(_)
            | NodeKind::Empty(_)
            | NodeKind::End(_) => unreachable!("terminals are matched above"),
        }
    }

    /// Nodes that never re-enter the engine; `None` for the others. Kept out
    /// of `evaluate` so the frames of nested attempts stay small.
    fn match_terminal(&self, kind: &NodeKind, pos: usize) -> Option<Result<Matched, Mismatch>> {
        let result = match kind {
            NodeKind::Literal(text) => self.match_literal(text, pos),
            NodeKind::Exists(target) => self
                .match_literal(target, pos)
                .map(|m| Matched::new(Some(Value::Bool(true)), m.end)),
            NodeKind::Pattern(pattern) => self.match_pattern(pattern, pos),
            NodeKind::FunctionMatch(transform) => match transform.apply(&self.input[pos..]) {
                Ok(value) => Ok(Matched::new(Some(value), self.input.len())),
                Err(message) => Err(self.mismatch(
                    MismatchKind::TransformFailed,
                    pos,
                    Expected::Accepted(message),
                )),
            },
            NodeKind::Primitive(primitive) => self.match_primitive(primitive.as_ref(), pos),
            NodeKind::Empty(value) => Ok(Matched::new(value.clone(), pos)),
            NodeKind::End(value) if pos == self.input.len() => {
                Ok(Matched::new(value.clone(), pos))
            }
            NodeKind::End(_) => Err(self.mismatch(
                MismatchKind::IncompleteConsumption,
                pos,
                Expected::EndOfInput,
            )),
            NodeKind::Sequence(_)
            | NodeKind::Repeat(_)
            | NodeKind::Alternative(..)
            | NodeKind::Lazy(_)
            | NodeKind::Flatten(_)
            | NodeKind::Reduce(_)
            | NodeKind::Field(..)
            | NodeKind::Wildcard(_) => return None,
        };
        Some(result)
    }

    fn match_literal(&self, text: &str, pos: usize) -> Result<Matched, Mismatch> {
        let rest = &self.input[pos..];
        if rest.starts_with(text) {
            return Ok(Matched::new(None, pos + text.len()));
        }

        let common: usize = rest
            .chars()
            .zip(text.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        Err(self.mismatch(
            MismatchKind::LiteralMismatch,
            pos + common,
            Expected::Literal(text.to_owned()),
        ))
    }

    fn match_pattern(&self, pattern: &Pattern, pos: usize) -> Result<Matched, Mismatch> {
        match pattern.match_at(self.input, pos) {
            Some(end) => Ok(Matched::new(
                Some(Value::String(self.input[pos..end].to_owned())),
                end,
            )),
            None => Err(self.mismatch(
                MismatchKind::PatternMismatch,
                pos,
                Expected::Pattern(pattern.as_str().to_owned()),
            )),
        }
    }

    fn match_primitive(
        &self,
        primitive: &dyn Primitive,
        pos: usize,
    ) -> Result<Matched, Mismatch> {
        let failed = |message: String| {
            let name = primitive.name().to_owned();
            let expected = Expected::Primitive { name, message };
            self.mismatch(MismatchKind::PrimitiveFailed, pos, expected)
        };

        match primitive.parse(self.input, pos) {
            Ok((value, end)) if end >= pos && self.input.is_char_boundary(end) => {
                Ok(Matched::new(value, end))
            }
            Ok((_, end)) => {
                let message = format!(
                    "returned end {} outside {}..{}",
                    self.abs(end),
                    self.abs(pos),
                    self.abs(self.input.len())
                );
                Err(failed(message))
            }
            Err(message) => Err(failed(message)),
        }
    }

    fn match_sequence(
        &mut self,
        children: &[Expr],
        pos: usize,
        cont: Option<ContId>,
    ) -> Result<Matched, ParseError> {
        let conts = self.child_continuations(children, cont);
        let mut assembly = Assembly::new();
        let mut at = pos;

        for (child, child_cont) in children.iter().zip(conts) {
            let m = self.attempt(child, at, child_cont)?;
            at = m.end;
            assembly.push(m.value, m.spread);
        }

        Ok(Matched::new(Some(assembly.finish()), at))
    }

    /// Continuation of child `i` is children `i+1..` followed by `cont`.
    fn child_continuations(
        &mut self,
        children: &[Expr],
        cont: Option<ContId>,
    ) -> Vec<Option<ContId>> {
        let mut conts = vec![cont; children.len()];
        let mut next = cont;
        for i in (1..children.len()).rev() {
            let min_len = self.lookahead.min_len(&children[i]);
            next = Some(self.conts.intern(&children[i], next, min_len));
            conts[i - 1] = next;
        }
        conts
    }

    /// One or more items, folded in a loop. Every item gets the optional
    /// tail as its continuation, and an item after which the tail would be
    /// pruned is given up, as if the tail had been entered recursively.
    fn match_repeat(
        &mut self,
        item: &Expr,
        rest: &Expr,
        pos: usize,
        cont: Option<ContId>,
    ) -> Result<Matched, ParseError> {
        let rest_len = self.lookahead.min_len(rest);
        let item_cont = Some(self.conts.intern(rest, cont, rest_len));
        let needed = self.conts.min_len(item_cont);

        let first = self.attempt(item, pos, item_cont)?;
        if first.end + needed > self.input.len() {
            return Err(self.prune(rest, first.end, needed).into());
        }

        let mut items = Vec::new();
        let mut at = first.end;
        splice(&mut items, first.value);

        loop {
            let m = match self.attempt(item, at, item_cont) {
                Ok(m) => m,
                Err(ParseError::Mismatch(_)) => break,
                Err(e) => return Err(e),
            };
            // An item that consumes nothing would repeat forever.
            if m.end == at {
                break;
            }
            if m.end + needed > self.input.len() {
                self.prune(rest, m.end, needed);
                break;
            }
            at = m.end;
            splice(&mut items, m.value);
        }

        Ok(Matched::new(Some(Value::Array(items)), at).spread(true))
    }

    fn match_alternative(
        &mut self,
        expr: &Expr,
        first: &Expr,
        second: &Expr,
        pos: usize,
        cont: Option<ContId>,
    ) -> Result<Matched, ParseError> {
        let first_failure = match self.attempt(first, pos, cont) {
            Err(ParseError::Mismatch(m)) => m,
            other => return other,
        };

        let at = self.abs(pos);
        self.tracer.trace_fallback(expr, at);
        match self.attempt(second, pos, cont) {
            Err(ParseError::Mismatch(m)) => Err(first_failure.furthest(m).into()),
            other => other,
        }
    }

    fn match_wildcard(
        &mut self,
        sub: Option<&Expr>,
        pos: usize,
        cont: Option<ContId>,
    ) -> Result<Matched, ParseError> {
        let end = self.boundary(pos, cont);
        let Some(sub) = sub else {
            let span = self.input[pos..end].to_owned();
            return Ok(Matched::new(Some(Value::String(span)), end));
        };

        let value = self.subparse(sub, pos, end)?;
        Ok(Matched::new(value, end))
    }

    /// Nearest position at or after `pos` where the continuation can begin.
    fn boundary(&mut self, pos: usize, cont: Option<ContId>) -> usize {
        let len = self.input.len();
        let heads = self.continuation_heads(cont);

        heads
            .iter()
            .map(|head| match head {
                Head::Literal(text) => self.input[pos..]
                    .find(text.as_str())
                    .map_or(len, |i| pos + i),
                Head::Pattern(pattern) => pattern.find_from(self.input, pos).unwrap_or(len),
                Head::Unknown | Head::Transparent => len,
            })
            .min()
            .unwrap_or(len)
    }

    /// Heads of a continuation, looking through transparent frames. The end
    /// of the chain contributes `Unknown`.
    fn continuation_heads(&mut self, cont: Option<ContId>) -> Rc<[Head]> {
        if let Some(heads) = self.cont_heads.get(&cont) {
            return heads.clone();
        }

        let mut heads = Vec::new();
        let mut current = cont;
        loop {
            let Some(id) = current else {
                heads.push(Head::Unknown);
                break;
            };
            let (node, next) = {
                let frame = self.conts.ensure_frame(id);
                (frame.node.clone(), frame.next)
            };

            let mut transparent = false;
            for head in self.lookahead.heads(&node).iter() {
                if head.is_transparent() {
                    transparent = true;
                } else {
                    heads.push(head.clone());
                }
            }
            if !transparent {
                break;
            }
            current = next;
        }

        let heads: Rc<[Head]> = heads.into();
        self.cont_heads.insert(cont, heads.clone());
        heads
    }

    /// Parse `input[start..end]` on its own against `sub`.
    fn subparse(
        &mut self,
        sub: &Expr,
        start: usize,
        end: usize,
    ) -> Result<Option<Value>, ParseError> {
        let input = self.input;
        let offset = self.abs(start);
        let span_end = self.abs(end);
        self.tracer.trace_enter_subparse(sub, offset, span_end);

        let result = {
            let mut inner = Session::new(
                &input[start..end],
                offset,
                self.memoize,
                &mut *self.budget,
                &mut *self.tracer,
            );
            inner.run(sub)
        };

        self.tracer.trace_exit_subparse(result.is_ok());
        match result {
            Ok(m) => Ok(m.value),
            Err(ParseError::Mismatch(m)) if m.kind == MismatchKind::IncompleteConsumption => {
                Err(Mismatch {
                    kind: MismatchKind::BoundsError,
                    expected: vec![Expected::SpanEnd(span_end)],
                    ..m
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    #[inline]
    fn abs(&self, pos: usize) -> usize {
        self.offset + pos
    }

    fn mismatch(&self, kind: MismatchKind, pos: usize, expected: Expected) -> Mismatch {
        Mismatch::new(kind, self.abs(pos), expected).found(self.found_at(pos))
    }

    /// Next character at `pos`, `None` at end of input.
    fn found_at(&self, pos: usize) -> Option<&str> {
        let rest = &self.input[pos..];
        rest.chars().next().map(|c| &rest[..c.len_utf8()])
    }
}
