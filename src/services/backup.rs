//! JSON backup interchange. Exports use the persisted document layout; imports
//! also accept a bare array of contests written by older versions.

use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{ContestEntity, MIN_SCHEMA_VERSION, PersistedState},
    state::{model::Contest, scoreboard::Scoreboard},
};

/// Reasons a backup payload is rejected. Nothing is applied on failure.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Neither the full document nor a bare contest list could be parsed.
    #[error("backup file is not valid: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The document predates the oldest supported layout.
    #[error("unsupported backup schema version {found} (minimum {})", MIN_SCHEMA_VERSION)]
    UnsupportedSchema { found: u32 },
}

/// Contests decoded from a backup, ready to replace the current ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedState {
    pub contests: Vec<Contest>,
    pub selected_contest_id: Option<Uuid>,
}

/// Serialise the whole scoreboard as a pretty-printed backup document.
pub fn export_backup(board: &Scoreboard) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&board.snapshot())
}

/// Decode a backup payload without touching any state.
///
/// The full document is tried first; if that fails to parse, the payload is
/// read as a bare list of contests and the first contest becomes selected.
pub fn parse_backup(payload: &[u8]) -> Result<ImportedState, ImportError> {
    let (contests, selected) = match serde_json::from_slice::<PersistedState>(payload) {
        Ok(document) => {
            if !document.is_supported() {
                return Err(ImportError::UnsupportedSchema {
                    found: document.schema_version,
                });
            }
            (document.contests, document.selected_contest_id)
        }
        Err(document_err) => match serde_json::from_slice::<Vec<ContestEntity>>(payload) {
            Ok(contests) => (contests, None),
            Err(_) => return Err(ImportError::Malformed(document_err)),
        },
    };

    let contests: Vec<Contest> = contests.into_iter().map(Into::into).collect();
    let selected_contest_id = selected
        .filter(|id| contests.iter().any(|contest| contest.id == *id))
        .or_else(|| contests.first().map(|contest| contest.id));

    Ok(ImportedState {
        contests,
        selected_contest_id,
    })
}
