use std::sync::Mutex;

use crate::dao::{models::PersistedState, state_store::StateStore};

/// Store keeping every write in memory, used to observe save behaviour.
#[derive(Default)]
pub struct MemoryStateStore {
    writes: Mutex<Vec<PersistedState>>,
}

impl MemoryStateStore {
    /// Every snapshot handed to `save`, oldest first.
    pub fn writes(&self) -> Vec<PersistedState> {
        self.writes.lock().unwrap().clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Option<PersistedState> {
        self.writes.lock().unwrap().last().cloned()
    }

    fn save(&self, state: &PersistedState) {
        self.writes.lock().unwrap().push(state.clone());
    }
}
