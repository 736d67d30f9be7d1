pub mod model;
pub mod scoreboard;
mod sse;
pub mod undo;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    dao::{models::PersistedState, state_store::StateStore},
    services::save_scheduler::SaveScheduler,
};

pub use self::scoreboard::{Scoreboard, ScoreboardError, UndoOutcome};
pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Capacity of the change-notification channel.
const EVENTS_CAPACITY: usize = 64;

/// Central application state: the scoreboard, its save pipeline and the
/// change-notification hub.
pub struct AppState {
    config: AppConfig,
    board: RwLock<Scoreboard>,
    saver: SaveScheduler,
    events: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// `initial` is whatever the store loaded at startup; `None` starts empty.
    /// Must be called from within a Tokio runtime since it spawns the save worker.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn StateStore>,
        initial: Option<PersistedState>,
    ) -> SharedState {
        let board = initial
            .map(Scoreboard::from_persisted)
            .unwrap_or_default();
        let saver = SaveScheduler::spawn(store, config.save_debounce());
        Arc::new(Self {
            config,
            board: RwLock::new(board),
            saver,
            events: SseHub::new(EVENTS_CAPACITY),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Broadcast hub used for the SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }

    /// Debounced save pipeline.
    pub fn saver(&self) -> &SaveScheduler {
        &self.saver
    }

    /// Run a read-only projection over the scoreboard.
    pub async fn read<T>(&self, read: impl FnOnce(&Scoreboard) -> T) -> T {
        let guard = self.board.read().await;
        read(&*guard)
    }

    /// Apply a mutation and, when it succeeds, schedule a save of the
    /// resulting snapshot.
    ///
    /// The snapshot is captured while the write lock is still held so the
    /// scheduler always sees snapshots in mutation order.
    pub async fn mutate<T, E>(
        &self,
        mutation: impl FnOnce(&mut Scoreboard) -> Result<T, E>,
    ) -> Result<T, E> {
        self.mutate_and_notify(mutation, |_| {}).await
    }

    /// Same as [`AppState::mutate`], then hand the result to `notify` before
    /// the write lock is released.
    ///
    /// Change events sent from `notify` reach subscribers in mutation order.
    pub async fn mutate_and_notify<T, E>(
        &self,
        mutation: impl FnOnce(&mut Scoreboard) -> Result<T, E>,
        notify: impl FnOnce(&T),
    ) -> Result<T, E> {
        let mut guard = self.board.write().await;
        let value = mutation(&mut *guard)?;
        self.saver.schedule(guard.snapshot());
        notify(&value);
        Ok(value)
    }
}
