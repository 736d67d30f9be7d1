/// Persisted document layout.
pub mod models;
/// Snapshot persistence behind the [`state_store::StateStore`] seam.
pub mod state_store;
