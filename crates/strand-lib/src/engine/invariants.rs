//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::continuation::{ContId, Continuations, Frame};
use super::translator::Budget;

impl Continuations {
    pub(crate) fn ensure_frame(&self, id: ContId) -> &Frame {
        self.try_get(id).unwrap_or_else(|| {
            panic!(
                "Continuations: frame {} not found \
                 (ids must come from the session that interned them)",
                id.index()
            )
        })
    }
}

impl Budget {
    pub(crate) fn ensure_depth_taken(&self) {
        assert!(
            self.depth > 0,
            "Budget: recursion depth released more often than taken"
        );
    }
}
