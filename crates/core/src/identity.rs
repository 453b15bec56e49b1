#![forbid(unsafe_code)]

use crate::ids::StageId;
use std::collections::HashMap;

/// Stage id → arena slot of its node. A stage has a node iff it is registered here.
#[derive(Clone, Debug, Default)]
pub struct IdentityIndex {
    slots: HashMap<StageId, usize>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: StageId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    pub fn contains(&self, id: StageId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Registers `id`. Ids are never re-pointed: registering a known id is a bug in the caller.
    pub fn insert(&mut self, id: StageId, slot: usize) {
        let previous = self.slots.insert(id, slot);
        debug_assert!(previous.is_none(), "stage {id} registered twice");
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
