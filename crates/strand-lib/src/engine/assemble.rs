//! Value assembly for sequences and reduce.

use strand_core::Value;

/// Accumulates a sequence's array value child by child.
///
/// - no value: skipped
/// - spread array: elements appended as-is
/// - object: merged into the first object already in the array
/// - anything else: appended
#[derive(Default)]
pub(crate) struct Assembly {
    items: Vec<Value>,
    object_slot: Option<usize>,
}

impl Assembly {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, value: Option<Value>, spread: bool) {
        let Some(value) = value else {
            return;
        };

        match value {
            Value::Array(items) if spread => {
                let base = self.items.len();
                self.items.extend(items);
                if self.object_slot.is_none() {
                    self.object_slot = self.items[base..]
                        .iter()
                        .position(Value::is_object)
                        .map(|i| base + i);
                }
            }
            Value::Object(_) => match self.object_slot {
                Some(slot) => {
                    self.items[slot].merge_object(value);
                }
                None => {
                    self.object_slot = Some(self.items.len());
                    self.items.push(value);
                }
            },
            other => self.items.push(other),
        }
    }

    pub(crate) fn finish(self) -> Value {
        Value::Array(self.items)
    }
}

/// Append one repetition item: arrays contribute their elements, anything
/// else itself. Objects of different items are never merged.
pub(crate) fn splice(items: &mut Vec<Value>, value: Option<Value>) {
    match value {
        Some(Value::Array(values)) => items.extend(values),
        Some(other) => items.push(other),
        None => {}
    }
}

/// Collapse an array result.
///
/// Objects in the array merge into one; without objects the first element
/// wins; an empty array yields no value. Non-arrays pass through.
pub(crate) fn reduce(value: Value) -> Option<Value> {
    let Value::Array(items) = value else {
        return Some(value);
    };

    let mut merged: Option<Value> = None;
    let mut first: Option<Value> = None;

    for item in items {
        if item.is_object() {
            match &mut merged {
                Some(into) => {
                    into.merge_object(item);
                }
                None => merged = Some(item),
            }
        } else if first.is_none() {
            first = Some(item);
        }
    }

    merged.or(first)
}
