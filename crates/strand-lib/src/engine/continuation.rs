//! Interned continuations.
//!
//! A continuation is "what must match after the current node": a linked
//! chain of frames ending in `None`. Frames are hash-consed on
//! `(node, next)`, so equal chains share one [`ContId`] and therefore one
//! set of memo entries.

use std::collections::HashMap;

use crate::grammar::{Expr, NodeId};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ContId(u32);

impl ContId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) struct Frame {
    pub node: Expr,
    pub next: Option<ContId>,
    /// Minimum length of this node plus everything after it.
    pub min_len: usize,
}

#[derive(Default)]
pub(crate) struct Continuations {
    frames: Vec<Frame>,
    index: HashMap<(NodeId, Option<ContId>), ContId>,
}

impl Continuations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Intern the chain `node` then `next`. `node_min_len` is the static
    /// minimum length of `node` alone.
    pub(crate) fn intern(&mut self, node: &Expr, next: Option<ContId>, node_min_len: usize) -> ContId {
        let key = (node.id(), next);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }

        let id = ContId(self.frames.len() as u32);
        let min_len = node_min_len + self.min_len(next);
        self.frames.push(Frame {
            node: node.clone(),
            next,
            min_len,
        });
        self.index.insert(key, id);
        id
    }

    pub(crate) fn try_get(&self, id: ContId) -> Option<&Frame> {
        self.frames.get(id.index())
    }

    /// Minimum length of a whole chain; zero for the empty chain.
    pub(crate) fn min_len(&self, cont: Option<ContId>) -> usize {
        cont.map_or(0, |id| self.ensure_frame(id).min_len)
    }
}
