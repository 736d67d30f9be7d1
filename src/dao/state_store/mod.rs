pub mod file;
#[cfg(test)]
pub mod memory;

use crate::dao::models::PersistedState;

/// Exclusive owner of the persisted snapshot.
///
/// Implementations never surface failures: `load` degrades to `None` and
/// `save` swallows errors, leaving the in-memory state authoritative.
pub trait StateStore: Send + Sync {
    /// Read the last complete snapshot, or `None` on first run or when nothing
    /// readable survives.
    fn load(&self) -> Option<PersistedState>;
    /// Persist `state`, replacing the previous snapshot all-or-nothing.
    fn save(&self, state: &PersistedState);
}
