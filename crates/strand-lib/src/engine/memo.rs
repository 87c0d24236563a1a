//! Packrat cache.
//!
//! Keyed on node identity, position and continuation. The continuation is
//! part of the key because a wildcard's extent (and so everything built on
//! it) depends on what follows.

use std::collections::HashMap;

use strand_core::Value;

use crate::grammar::NodeId;

use super::continuation::ContId;
use super::error::Mismatch;

/// Successful attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Matched {
    pub value: Option<Value>,
    pub end: usize,
    /// Set by flatten: an array value is spliced into the enclosing sequence.
    pub spread: bool,
}

impl Matched {
    pub(crate) fn new(value: Option<Value>, end: usize) -> Self {
        Self {
            value,
            end,
            spread: false,
        }
    }

    pub(crate) fn spread(mut self, spread: bool) -> Self {
        self.spread = spread;
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct MemoKey {
    pub node: NodeId,
    pub position: usize,
    pub cont: Option<ContId>,
}

/// Only recoverable outcomes are cached; fuel errors abort the session.
pub(crate) type MemoEntry = Result<Matched, Mismatch>;

#[derive(Default)]
pub(crate) struct Memo {
    entries: HashMap<MemoKey, MemoEntry>,
}

impl Memo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &MemoKey) -> Option<&MemoEntry> {
        self.entries.get(key)
    }

    pub(crate) fn insert(&mut self, key: MemoKey, entry: MemoEntry) {
        self.entries.insert(key, entry);
    }
}
