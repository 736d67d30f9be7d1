//! Debounced persistence: bursts of mutations collapse into one disk write
//! carrying the latest snapshot once a quiet interval has elapsed.

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use crate::dao::{models::PersistedState, state_store::StateStore};

/// Quiet interval used when the configuration does not override it.
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(400);

type PendingSnapshot = Option<Arc<PersistedState>>;

/// Handle used by the mutation path to request a deferred save.
///
/// Scheduling never blocks: it only replaces the pending snapshot. A single
/// worker task waits out the quiet interval and hands the latest snapshot to
/// the store on the blocking pool, so writes are strictly ordered and a write
/// already in flight always completes.
pub struct SaveScheduler {
    pending: watch::Sender<PendingSnapshot>,
    completed: watch::Receiver<u64>,
    worker: JoinHandle<()>,
}

impl SaveScheduler {
    /// Start the worker on the current Tokio runtime.
    pub fn spawn(store: Arc<dyn StateStore>, quiet: Duration) -> Self {
        let (pending, pending_rx) = watch::channel(None);
        let (completed_tx, completed) = watch::channel(0);
        let worker = tokio::spawn(run_worker(store, quiet, pending_rx, completed_tx));
        Self {
            pending,
            completed,
            worker,
        }
    }

    /// Replace any unfired save with one carrying `snapshot` and restart the
    /// quiet interval.
    pub fn schedule(&self, snapshot: PersistedState) {
        self.pending.send_replace(Some(Arc::new(snapshot)));
    }

    /// Counter of writes handed to the store so far.
    pub fn completed_writes(&self) -> watch::Receiver<u64> {
        self.completed.clone()
    }
}

impl Drop for SaveScheduler {
    fn drop(&mut self) {
        // Unfired saves are cancelled; the blocking pool finishes a write in flight.
        self.worker.abort();
    }
}

async fn run_worker(
    store: Arc<dyn StateStore>,
    quiet: Duration,
    mut pending: watch::Receiver<PendingSnapshot>,
    completed: watch::Sender<u64>,
) {
    loop {
        if pending.changed().await.is_err() {
            return;
        }

        // Every newer snapshot restarts the countdown.
        loop {
            tokio::select! {
                _ = sleep(quiet) => break,
                changed = pending.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let Some(snapshot) = pending.borrow_and_update().clone() else {
            continue;
        };

        let store = Arc::clone(&store);
        let contests = snapshot.contests.len();
        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(()) => debug!(contests, "debounced save flushed"),
            Err(err) => warn!(error = %err, "debounced save task failed"),
        }
        completed.send_modify(|count| *count += 1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, mpsc as std_mpsc};

    use tokio::{
        sync::mpsc,
        time::{advance, timeout},
    };

    use super::*;
    use crate::{
        dao::state_store::memory::MemoryStateStore,
        state::{model::AccentColor, scoreboard::Scoreboard},
    };

    async fn wait_for_writes(scheduler: &SaveScheduler, count: u64) {
        let mut completed = scheduler.completed_writes();
        timeout(
            Duration::from_secs(5),
            completed.wait_for(|written| *written >= count),
        )
        .await
        .expect("save did not complete in time")
        .expect("scheduler worker stopped");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_taps_coalesce_into_one_write_of_the_latest_state() {
        let store = Arc::new(MemoryStateStore::default());
        let scheduler = SaveScheduler::spawn(store.clone(), DEFAULT_QUIET_INTERVAL);

        let mut board = Scoreboard::new();
        let contest = board.create_contest("Jam A", AccentColor::default()).unwrap().id;
        let alice = board.add_entrant(contest, "Alice").unwrap().id;

        for _ in 0..5 {
            board.increment(contest, alice).unwrap();
            scheduler.schedule(board.snapshot());
            advance(Duration::from_millis(100)).await;
        }

        wait_for_writes(&scheduler, 1).await;
        advance(Duration::from_secs(2)).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].contests[0].entrants[0].score, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_written_before_the_quiet_interval() {
        let store = Arc::new(MemoryStateStore::default());
        let scheduler = SaveScheduler::spawn(store.clone(), DEFAULT_QUIET_INTERVAL);

        scheduler.schedule(PersistedState::empty());
        advance(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;
        assert!(store.writes().is_empty());

        wait_for_writes(&scheduler, 1).await;
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn separated_bursts_write_once_each() {
        let store = Arc::new(MemoryStateStore::default());
        let scheduler = SaveScheduler::spawn(store.clone(), DEFAULT_QUIET_INTERVAL);

        let first = PersistedState::empty();
        scheduler.schedule(first.clone());
        wait_for_writes(&scheduler, 1).await;

        let mut board = Scoreboard::new();
        board.create_contest("Jam B", AccentColor::default()).unwrap();
        scheduler.schedule(board.snapshot());
        wait_for_writes(&scheduler, 2).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], first);
        assert_eq!(writes[1], board.snapshot());
    }

    /// Store whose writes block until the test releases them.
    struct GatedStore {
        writes: Mutex<Vec<PersistedState>>,
        started: mpsc::UnboundedSender<()>,
        release: Mutex<std_mpsc::Receiver<()>>,
    }

    impl StateStore for GatedStore {
        fn load(&self) -> Option<PersistedState> {
            None
        }

        fn save(&self, state: &PersistedState) {
            let _ = self.started.send(());
            let _ = self.release.lock().unwrap().recv();
            self.writes.lock().unwrap().push(state.clone());
        }
    }

    fn named_snapshot(name: &str) -> PersistedState {
        let mut board = Scoreboard::new();
        board.create_contest(name, AccentColor::default()).unwrap();
        board.snapshot()
    }

    #[tokio::test]
    async fn snapshots_scheduled_during_a_write_follow_it_with_the_latest() {
        let (started_tx, mut started) = mpsc::unbounded_channel();
        let (release, release_rx) = std_mpsc::channel();
        let store = Arc::new(GatedStore {
            writes: Mutex::new(Vec::new()),
            started: started_tx,
            release: Mutex::new(release_rx),
        });
        let scheduler = SaveScheduler::spawn(store.clone(), Duration::from_millis(20));

        let first = named_snapshot("A");
        scheduler.schedule(first.clone());
        timeout(Duration::from_secs(5), started.recv())
            .await
            .unwrap()
            .unwrap();

        scheduler.schedule(named_snapshot("B"));
        let last = named_snapshot("C");
        scheduler.schedule(last.clone());
        release.send(()).unwrap();
        release.send(()).unwrap();

        wait_for_writes(&scheduler, 2).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(*store.writes.lock().unwrap(), vec![first, last]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_cancels_pending_saves() {
        let store = Arc::new(MemoryStateStore::default());
        let scheduler = SaveScheduler::spawn(store.clone(), DEFAULT_QUIET_INTERVAL);

        scheduler.schedule(PersistedState::empty());
        drop(scheduler);
        advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        assert!(store.writes().is_empty());
    }
}
