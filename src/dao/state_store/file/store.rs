use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::Path,
    sync::{Mutex, PoisonError},
};

use tracing::{debug, info, warn};

use crate::dao::{models::PersistedState, state_store::StateStore};

use super::{
    config::FileStoreConfig,
    error::{FileStoreError, FileStoreResult},
};

/// Snapshot store backed by a single JSON file plus one `.bak` generation.
///
/// Every write goes to a scratch file first and is renamed over the primary,
/// so readers observe either the previous or the new document, never a torn
/// one. The write gate serialises writers inside the process.
pub struct FileStateStore {
    config: FileStoreConfig,
    write_gate: Mutex<()>,
}

/// Raw file content together with its decoded form.
struct ReadSnapshot {
    bytes: Vec<u8>,
    state: PersistedState,
}

impl FileStateStore {
    /// Build a store rooted at the configured snapshot path.
    pub fn new(config: FileStoreConfig) -> Self {
        Self {
            config,
            write_gate: Mutex::new(()),
        }
    }

    /// Primary snapshot file.
    pub fn path(&self) -> &Path {
        self.config.path()
    }

    fn try_load(&self) -> Option<PersistedState> {
        let primary = self.config.path();
        let primary_err = match read_snapshot(primary) {
            Ok(Some(read)) => return Some(read.state),
            Ok(None) => {
                info!(path = %primary.display(), "no snapshot on disk; starting fresh");
                return None;
            }
            Err(err) => err,
        };

        let backup = self.config.backup_path();
        warn!(
            path = %primary.display(),
            error = %primary_err,
            "primary snapshot unreadable; falling back to backup"
        );

        match read_snapshot(&backup) {
            Ok(Some(read)) => {
                if let Err(err) = self.replace_primary(&read.bytes) {
                    warn!(
                        path = %primary.display(),
                        error = %err,
                        "failed to repair primary snapshot from backup"
                    );
                } else {
                    info!(path = %primary.display(), "primary snapshot repaired from backup");
                }
                Some(read.state)
            }
            Ok(None) => {
                warn!(path = %backup.display(), "no backup snapshot; starting fresh");
                None
            }
            Err(err) => {
                warn!(
                    path = %backup.display(),
                    error = %err,
                    "backup snapshot unreadable; starting fresh"
                );
                None
            }
        }
    }

    fn try_save(&self, state: &PersistedState) -> FileStoreResult<()> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|source| FileStoreError::Encode { source })?;
        self.replace_primary_rotating(&bytes)
    }

    /// Write `bytes` as the new primary, keeping the previous primary as the
    /// backup generation.
    fn replace_primary_rotating(&self, bytes: &[u8]) -> FileStoreResult<()> {
        let _gate = self.write_gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.ensure_parent()?;

        let temp = self.config.temp_path();
        write_synced(&temp, bytes)?;

        // Only a decodable primary may replace the backup generation.
        let primary = self.config.path();
        let result = match read_snapshot(primary) {
            Ok(Some(_)) => self
                .rotate_backup()
                .and_then(|()| rename(&temp, primary)),
            Ok(None) => rename(&temp, primary),
            Err(err) => {
                warn!(
                    path = %primary.display(),
                    error = %err,
                    "current snapshot unreadable; keeping existing backup"
                );
                rename(&temp, primary)
            }
        };

        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }

    /// Overwrite the primary without touching the backup generation.
    fn replace_primary(&self, bytes: &[u8]) -> FileStoreResult<()> {
        let _gate = self.write_gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.ensure_parent()?;

        let temp = self.config.temp_path();
        write_synced(&temp, bytes)?;
        rename(&temp, self.config.path()).inspect_err(|_| {
            let _ = fs::remove_file(&temp);
        })
    }

    /// Copy the current primary into the backup slot via its own scratch file.
    fn rotate_backup(&self) -> FileStoreResult<()> {
        let primary = self.config.path();
        let staged = self.config.temp_path();
        fs::copy(primary, &staged).map_err(|source| FileStoreError::io(primary, source))?;
        rename(&staged, &self.config.backup_path()).inspect_err(|_| {
            let _ = fs::remove_file(&staged);
        })
    }

    fn ensure_parent(&self) -> FileStoreResult<()> {
        match self.config.parent() {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|source| FileStoreError::io(parent, source))
            }
            None => Ok(()),
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Option<PersistedState> {
        self.try_load()
    }

    fn save(&self, state: &PersistedState) {
        match self.try_save(state) {
            Ok(()) => debug!(
                path = %self.path().display(),
                contests = state.contests.len(),
                "snapshot written"
            ),
            Err(err) => warn!(
                path = %self.path().display(),
                error = %err,
                "failed to write snapshot; keeping in-memory state"
            ),
        }
    }
}

/// Read and validate a snapshot; `Ok(None)` means the file does not exist.
fn read_snapshot(path: &Path) -> FileStoreResult<Option<ReadSnapshot>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(FileStoreError::io(path, err)),
    };

    let state: PersistedState =
        serde_json::from_slice(&bytes).map_err(|source| FileStoreError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    if !state.is_supported() {
        return Err(FileStoreError::UnsupportedSchema {
            path: path.to_path_buf(),
            found: state.schema_version,
        });
    }

    Ok(Some(ReadSnapshot { bytes, state }))
}

fn write_synced(path: &Path, bytes: &[u8]) -> FileStoreResult<()> {
    let result = File::create(path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .map_err(|source| FileStoreError::io(path, source));

    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

fn rename(from: &Path, to: &Path) -> FileStoreResult<()> {
    fs::rename(from, to).map_err(|source| FileStoreError::io(to, source))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use tempfile::TempDir;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::dao::models::{ContestEntity, EntrantEntity, SCHEMA_VERSION};

    fn store_in(dir: &TempDir) -> FileStateStore {
        FileStateStore::new(FileStoreConfig::new(dir.path().join("data/contests.json")))
    }

    fn sample_state(name: &str, score: u32) -> PersistedState {
        let contest_id = Uuid::new_v4();
        PersistedState {
            schema_version: SCHEMA_VERSION,
            contests: vec![ContestEntity {
                id: contest_id,
                name: name.to_string(),
                created_at: OffsetDateTime::from_unix_timestamp(1_714_588_200).unwrap(),
                entrants: vec![EntrantEntity {
                    id: Uuid::new_v4(),
                    name: "Alice".into(),
                    score,
                }],
                accent_hex: "#FF9500".into(),
            }],
            selected_contest_id: Some(contest_id),
        }
    }

    fn leftover_temp_files(dir: &TempDir) -> usize {
        fs::read_dir(dir.path().join("data"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn first_run_loads_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let state = sample_state("Jam A", 5);

        store.save(&state);

        assert_eq!(store.load(), Some(state));
        assert!(!FileStoreConfig::new(store.path()).backup_path().exists());
        assert_eq!(leftover_temp_files(&dir), 0);
    }

    #[test]
    fn second_save_keeps_previous_generation_as_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = sample_state("Jam A", 1);
        let second = sample_state("Jam B", 2);
        let third = sample_state("Jam C", 3);

        store.save(&first);
        store.save(&second);
        let backup_path = FileStoreConfig::new(store.path()).backup_path();
        let backup: PersistedState =
            serde_json::from_slice(&fs::read(&backup_path).unwrap()).unwrap();
        assert_eq!(backup, first);

        store.save(&third);
        let backup: PersistedState =
            serde_json::from_slice(&fs::read(&backup_path).unwrap()).unwrap();
        assert_eq!(backup, second, "only a single generation is kept");
        assert_eq!(store.load(), Some(third));
        assert_eq!(leftover_temp_files(&dir), 0);
    }

    #[test]
    fn corrupted_primary_recovers_from_backup_and_repairs() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let good = sample_state("Jam A", 4);
        store.save(&good);
        store.save(&sample_state("Jam B", 9));

        fs::write(store.path(), b"{\"schemaVersion\": 1, \"contests\": [").unwrap();

        assert_eq!(store.load(), Some(good.clone()));
        let repaired: PersistedState =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(repaired, good);
    }

    #[test]
    fn unreadable_primary_does_not_overwrite_the_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let good = sample_state("Jam A", 4);
        store.save(&good);
        store.save(&sample_state("Jam B", 9));
        fs::write(store.path(), b"garbage").unwrap();

        let next = sample_state("Jam C", 1);
        store.save(&next);

        let backup_path = FileStoreConfig::new(store.path()).backup_path();
        let backup: PersistedState =
            serde_json::from_slice(&fs::read(&backup_path).unwrap()).unwrap();
        assert_eq!(backup, good);
        assert_eq!(store.load(), Some(next));
        assert_eq!(leftover_temp_files(&dir), 0);
    }

    #[test]
    fn schema_version_zero_is_never_returned() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut outdated = sample_state("Old", 7);
        outdated.schema_version = 0;
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), serde_json::to_vec(&outdated).unwrap()).unwrap();

        assert_eq!(store.load(), None);

        let backup = sample_state("Backup", 2);
        fs::write(
            FileStoreConfig::new(store.path()).backup_path(),
            serde_json::to_vec(&backup).unwrap(),
        )
        .unwrap();
        assert_eq!(store.load(), Some(backup));
    }

    #[test]
    fn unreadable_primary_and_backup_yield_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), b"not json").unwrap();
        fs::write(FileStoreConfig::new(store.path()).backup_path(), b"[]").unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"a file, not a directory").unwrap();
        let store = FileStateStore::new(FileStoreConfig::new(blocker.join("contests.json")));

        store.save(&sample_state("Jam A", 1));

        assert_eq!(store.load(), None);
    }

    #[test]
    fn readers_never_observe_torn_writes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));
        let states: Vec<PersistedState> = (0..4)
            .map(|round| sample_state(&"x".repeat(4096 * (round + 1)), round as u32))
            .collect();
        store.save(&states[0]);

        thread::scope(|scope| {
            for writer in 0..2 {
                let store = Arc::clone(&store);
                let states = &states;
                scope.spawn(move || {
                    for round in 0..25 {
                        store.save(&states[(round + writer) % states.len()]);
                    }
                });
            }

            for _ in 0..200 {
                let read = read_snapshot(store.path())
                    .expect("a complete document is always visible")
                    .expect("primary exists after the first save");
                assert!(states.contains(&read.state));
            }
        });

        assert_eq!(leftover_temp_files(&dir), 0);
    }
}
