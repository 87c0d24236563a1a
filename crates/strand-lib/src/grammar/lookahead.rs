//! Static lookahead: which text can begin a node, and how much it consumes
//! at least.
//!
//! Results are cached per node id. Recursion through lazy references is cut
//! by an in-progress set and two depth bounds; a cut answers the safe value
//! (`Unknown` head, zero length).

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::node::{Expr, NodeId, NodeKind, Pattern};

/// Deepest descent before lookahead gives up and answers the safe value.
const MAX_DEPTH: usize = 256;

/// Lazy references followed along one descent. Resolvers that build fresh
/// nodes on every call would otherwise be expanded without end.
const MAX_LAZY_DEPTH: usize = 6;

/// Possible beginning of a node's match.
#[derive(Clone, Debug)]
pub enum Head {
    Literal(String),
    Pattern(Pattern),
    /// Anything may follow; a wildcard scanning for this head runs to the end.
    Unknown,
    /// The node may match nothing; whatever comes after it also counts.
    Transparent,
}

impl Head {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Head::Transparent)
    }
}

#[derive(Clone, Debug)]
pub struct LookaheadInfo {
    pub heads: Rc<[Head]>,
    pub min_len: usize,
}

/// Per-session lookahead tables.
#[derive(Default)]
pub struct Lookahead {
    heads: HashMap<NodeId, Rc<[Head]>>,
    min_len: HashMap<NodeId, usize>,
    active: HashSet<NodeId>,
    depth: usize,
    lazy_depth: usize,
}

impl Lookahead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, expr: &Expr) -> LookaheadInfo {
        LookaheadInfo {
            heads: self.heads(expr),
            min_len: self.min_len(expr),
        }
    }

    /// Lower bound on the bytes consumed by any successful match of `expr`.
    pub fn min_len(&mut self, expr: &Expr) -> usize {
        if let Some(&len) = self.min_len.get(&expr.id()) {
            return len;
        }
        if !self.enter(expr) {
            return 0;
        }

        let len = match expr.kind() {
            NodeKind::Literal(text) | NodeKind::Exists(text) => text.len(),
            NodeKind::Pattern(p) => p.min_len(),
            NodeKind::Sequence(children) => children.iter().map(|c| self.min_len(c)).sum(),
            NodeKind::Repeat(parts) => parts.iter().map(|c| self.min_len(c)).sum(),
            NodeKind::Alternative(a, b) => self.min_len(a).min(self.min_len(b)),
            NodeKind::Lazy(_) => match self.resolve(expr) {
                Some(target) => {
                    let len = self.min_len(&target);
                    self.lazy_depth -= 1;
                    len
                }
                None => 0,
            },
            NodeKind::Flatten(child) | NodeKind::Reduce(child) | NodeKind::Field(_, child) => {
                self.min_len(child)
            }
            NodeKind::Wildcard(Some(sub)) => self.min_len(sub),
            NodeKind::Primitive(primitive) => primitive.min_len(),
            NodeKind::Wildcard(None)
            | NodeKind::FunctionMatch(_)
            | NodeKind::Empty(_)
            | NodeKind::End(_) => 0,
        };

        self.leave(expr);
        // A cut inside only ever lowers the bound, so caching stays sound.
        self.min_len.insert(expr.id(), len);
        len
    }

    /// Possible beginnings of `expr`, `Transparent` included when it can
    /// match the empty string without committing to any text.
    pub fn heads(&mut self, expr: &Expr) -> Rc<[Head]> {
        self.heads_checked(expr).0
    }

    /// Heads plus whether the answer is exact (no cut happened below).
    fn heads_checked(&mut self, expr: &Expr) -> (Rc<[Head]>, bool) {
        if let Some(heads) = self.heads.get(&expr.id()) {
            return (heads.clone(), true);
        }
        if !self.enter(expr) {
            return (Rc::from([Head::Unknown]), false);
        }

        let (heads, exact): (Rc<[Head]>, bool) = match expr.kind() {
            NodeKind::Literal(text) | NodeKind::Exists(text) if text.is_empty() => {
                (Rc::from([Head::Transparent]), true)
            }
            NodeKind::Literal(text) | NodeKind::Exists(text) => {
                (Rc::from([Head::Literal(text.clone())]), true)
            }
            NodeKind::Pattern(p) => (Rc::from([Head::Pattern(p.clone())]), true),
            NodeKind::Sequence(children) => {
                let (heads, exact) = self.sequence_heads(children);
                (heads.into(), exact)
            }
            NodeKind::Repeat(parts) => {
                let (heads, exact) = self.sequence_heads(parts);
                (heads.into(), exact)
            }
            NodeKind::Alternative(a, b) => {
                let (first, first_exact) = self.heads_checked(a);
                let (second, second_exact) = self.heads_checked(b);
                let heads: Vec<Head> = first.iter().chain(second.iter()).cloned().collect();
                (heads.into(), first_exact && second_exact)
            }
            NodeKind::Lazy(_) => match self.resolve(expr) {
                Some(target) => {
                    let result = self.heads_checked(&target);
                    self.lazy_depth -= 1;
                    result
                }
                None => (Rc::from([Head::Unknown]), false),
            },
            NodeKind::Flatten(child) | NodeKind::Reduce(child) | NodeKind::Field(_, child) => {
                self.heads_checked(child)
            }
            NodeKind::Wildcard(Some(sub)) => self.heads_checked(sub),
            NodeKind::Primitive(primitive) => {
                let heads = primitive.heads();
                if heads.is_empty() {
                    (Rc::from([Head::Unknown]), true)
                } else {
                    (heads.into(), true)
                }
            }
            NodeKind::Wildcard(None) | NodeKind::FunctionMatch(_) | NodeKind::End(_) => {
                (Rc::from([Head::Unknown]), true)
            }
            NodeKind::Empty(_) => (Rc::from([Head::Transparent]), true),
        };

        self.leave(expr);
        if exact {
            self.heads.insert(expr.id(), heads.clone());
        }
        (heads, exact)
    }

    fn sequence_heads(&mut self, children: &[Expr]) -> (Vec<Head>, bool) {
        let mut heads = Vec::new();
        let mut exact = true;

        for (i, child) in children.iter().enumerate() {
            let (child_heads, child_exact) = self.heads_checked(child);
            exact &= child_exact;

            if i == 0
                && let Some(prefix) = child.as_literal()
                && let Some(next) = children.get(1)
            {
                let (merged, next_exact) = self.merged_heads(prefix, next);
                return (merged, exact && next_exact);
            }

            let mut transparent = false;
            for head in child_heads.iter() {
                if head.is_transparent() {
                    transparent = true;
                } else {
                    heads.push(head.clone());
                }
            }
            if !transparent {
                return (heads, exact);
            }
        }

        heads.push(Head::Transparent);
        (heads, exact)
    }

    /// A literal followed by a node whose heads are all literals begins with
    /// one of the concatenations; otherwise just with the literal.
    fn merged_heads(&mut self, prefix: &str, next: &Expr) -> (Vec<Head>, bool) {
        let (next_heads, exact) = self.heads_checked(next);
        let all_literal =
            !next_heads.is_empty() && next_heads.iter().all(|h| matches!(h, Head::Literal(_)));

        if !all_literal {
            return (vec![Head::Literal(prefix.to_owned())], exact);
        }

        let merged = next_heads
            .iter()
            .filter_map(|h| match h {
                Head::Literal(text) => Some(Head::Literal(format!("{prefix}{text}"))),
                _ => None,
            })
            .collect();
        (merged, exact)
    }

    /// Resolve a lazy node unless the lazy bound is reached. The caller
    /// decrements `lazy_depth` once done with the target.
    fn resolve(&mut self, expr: &Expr) -> Option<Expr> {
        let NodeKind::Lazy(resolver) = expr.kind() else {
            return Some(expr.clone());
        };
        if self.lazy_depth >= MAX_LAZY_DEPTH {
            return None;
        }
        self.lazy_depth += 1;
        Some(resolver.resolve())
    }

    fn enter(&mut self, expr: &Expr) -> bool {
        if self.depth >= MAX_DEPTH || !self.active.insert(expr.id()) {
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self, expr: &Expr) {
        self.active.remove(&expr.id());
        self.depth -= 1;
    }
}
