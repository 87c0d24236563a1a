//! Left-recursion check.
//!
//! Walks every path a parse can take without consuming input. A node seen
//! twice on one such path, or a path longer than the recursion limit (lazy
//! resolvers that build fresh nodes never repeat an id), is left recursion.
//!
//! Children after a consuming one start at a later position; they are only
//! scanned for wildcard sub-grammars, which get their own walk. Left
//! recursion deeper than that surfaces at run time as a recursion limit.

use std::collections::HashSet;

use indexmap::IndexSet;

use super::error::GrammarError;
use super::node::{Expr, NodeId, NodeKind};

/// Reject grammars in which some rule can reach itself at the same position.
pub fn check_left_recursion(root: &Expr, limit: usize) -> Result<(), GrammarError> {
    let mut validator = Validator {
        limit,
        path: IndexSet::new(),
        depth: 0,
        done: HashSet::new(),
        scanned: HashSet::new(),
        nullable_active: HashSet::new(),
    };
    validator.visit_root(root)
}

struct Validator {
    limit: usize,
    path: IndexSet<NodeId>,
    depth: usize,
    done: HashSet<NodeId>,
    scanned: HashSet<NodeId>,
    nullable_active: HashSet<NodeId>,
}

impl Validator {
    /// Sub-grammars of wildcards parse a separate slice, so they start a
    /// fresh path.
    fn visit_root(&mut self, root: &Expr) -> Result<(), GrammarError> {
        let outer = std::mem::take(&mut self.path);
        let result = self.visit(root);
        self.path = outer;
        result
    }

    fn visit(&mut self, expr: &Expr) -> Result<(), GrammarError> {
        let id = expr.id();
        if self.done.contains(&id) {
            return Ok(());
        }
        if self.path.contains(&id) || self.depth >= self.limit {
            return Err(GrammarError::LeftRecursion {
                rule: format!("{expr:?}"),
            });
        }

        self.path.insert(id);
        self.depth += 1;
        match expr.kind() {
            NodeKind::Sequence(children) => self.visit_sequence(children)?,
            NodeKind::Repeat(parts) => self.visit_sequence(parts)?,
            NodeKind::Alternative(a, b) => {
                self.visit(a)?;
                self.visit(b)?;
            }
            NodeKind::Lazy(resolver) => self.visit(&resolver.resolve())?,
            NodeKind::Flatten(child) | NodeKind::Reduce(child) | NodeKind::Field(_, child) => {
                self.visit(child)?;
            }
            NodeKind::Wildcard(Some(sub)) => self.visit_root(sub)?,
            NodeKind::Literal(_)
            | NodeKind::Pattern(_)
            | NodeKind::Wildcard(None)
            | NodeKind::Exists(_)
            | NodeKind::FunctionMatch(_)
            | NodeKind::Primitive(_)
            | NodeKind::Empty(_)
            | NodeKind::End(_) => {}
        }
        self.path.pop();
        self.depth -= 1;

        self.done.insert(id);
        Ok(())
    }

    fn visit_sequence(&mut self, children: &[Expr]) -> Result<(), GrammarError> {
        let mut rest = children.iter();
        for child in rest.by_ref() {
            self.visit(child)?;
            if !self.nullable(child) {
                break;
            }
        }
        for child in rest {
            self.scan(child)?;
        }
        Ok(())
    }

    /// Find wildcard sub-grammars below `expr` without following lazy nodes.
    fn scan(&mut self, expr: &Expr) -> Result<(), GrammarError> {
        if self.done.contains(&expr.id()) || !self.scanned.insert(expr.id()) {
            return Ok(());
        }

        match expr.kind() {
            NodeKind::Wildcard(Some(sub)) => self.visit_root(sub),
            NodeKind::Sequence(children) => children.iter().try_for_each(|c| self.scan(c)),
            NodeKind::Repeat(parts) => parts.iter().try_for_each(|c| self.scan(c)),
            NodeKind::Alternative(a, b) => {
                self.scan(a)?;
                self.scan(b)
            }
            NodeKind::Flatten(child) | NodeKind::Reduce(child) | NodeKind::Field(_, child) => {
                self.scan(child)
            }
            NodeKind::Lazy(_)
            | NodeKind::Literal(_)
            | NodeKind::Pattern(_)
            | NodeKind::Wildcard(None)
            | NodeKind::Exists(_)
            | NodeKind::FunctionMatch(_)
            | NodeKind::Primitive(_)
            | NodeKind::Empty(_)
            | NodeKind::End(_) => Ok(()),
        }
    }

    /// Whether `expr` may succeed without consuming input.
    fn nullable(&mut self, expr: &Expr) -> bool {
        if self.nullable_active.len() >= self.limit || !self.nullable_active.insert(expr.id()) {
            return false;
        }

        let nullable = match expr.kind() {
            NodeKind::Literal(text) | NodeKind::Exists(text) => text.is_empty(),
            NodeKind::Pattern(p) => p.min_len() == 0,
            NodeKind::Sequence(children) => children.iter().all(|c| self.nullable(c)),
            NodeKind::Repeat(parts) => parts.iter().all(|c| self.nullable(c)),
            NodeKind::Alternative(a, b) => self.nullable(a) || self.nullable(b),
            NodeKind::Lazy(resolver) => self.nullable(&resolver.resolve()),
            NodeKind::Flatten(child) | NodeKind::Reduce(child) | NodeKind::Field(_, child) => {
                self.nullable(child)
            }
            NodeKind::Primitive(primitive) => primitive.min_len() == 0,
            NodeKind::Wildcard(_)
            | NodeKind::FunctionMatch(_)
            | NodeKind::Empty(_)
            | NodeKind::End(_) => true,
        };

        self.nullable_active.remove(&expr.id());
        nullable
    }
}
