//! DTO definitions used by the contest REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        format_timestamp,
        validation::{validate_accent_hex, validate_display_name},
    },
    services::leaderboard::LeaderboardRow,
    state::{
        Scoreboard, UndoOutcome,
        model::{Contest, Entrant},
    },
};

/// Payload to create a contest; the accent defaults to an unused palette color.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateContestRequest {
    #[validate(
        length(min = 1, max = 120),
        custom(function = "validate_display_name")
    )]
    pub name: String,
    #[validate(custom(function = "validate_accent_hex"))]
    pub accent_hex: Option<String>,
}

/// Partial update of a contest's name and/or accent.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateContestRequest {
    #[validate(
        length(min = 1, max = 120),
        custom(function = "validate_display_name")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "validate_accent_hex"))]
    pub accent_hex: Option<String>,
}

/// Payload to add an entrant or rename an existing one.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct EntrantNameRequest {
    #[validate(
        length(min = 1, max = 120),
        custom(function = "validate_display_name")
    )]
    pub name: String,
}

/// New display order of a contest's entrants (every entrant exactly once).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderEntrantsRequest {
    pub entrant_ids: Vec<Uuid>,
}

/// Entrant as exposed to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntrantSummary {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
}

impl From<&Entrant> for EntrantSummary {
    fn from(entrant: &Entrant) -> Self {
        Self {
            id: entrant.id,
            name: entrant.name.clone(),
            score: entrant.score,
        }
    }
}

/// Compact contest projection used in listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContestSummary {
    pub id: Uuid,
    pub name: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    pub accent_hex: String,
    pub entrant_count: usize,
}

impl From<&Contest> for ContestSummary {
    fn from(contest: &Contest) -> Self {
        Self {
            id: contest.id,
            name: contest.name.clone(),
            created_at: format_timestamp(contest.created_at),
            accent_hex: contest.accent.to_string(),
            entrant_count: contest.entrants.len(),
        }
    }
}

/// Full contest view including entrants in display order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContestDetail {
    pub id: Uuid,
    pub name: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    pub accent_hex: String,
    pub entrants: Vec<EntrantSummary>,
    /// Whether the last score change can be reverted.
    pub can_undo: bool,
    /// Whether this contest is the resolved selection.
    pub selected: bool,
}

impl ContestDetail {
    /// Project a contest together with its board-level flags.
    pub fn from_board(board: &Scoreboard, contest: &Contest) -> Self {
        Self {
            id: contest.id,
            name: contest.name.clone(),
            created_at: format_timestamp(contest.created_at),
            accent_hex: contest.accent.to_string(),
            entrants: contest.entrants.iter().map(EntrantSummary::from).collect(),
            can_undo: board.can_undo(contest.id),
            selected: board.selected_contest().map(|selected| selected.id) == Some(contest.id),
        }
    }
}

/// Every contest plus the resolved selection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContestListResponse {
    pub contests: Vec<ContestSummary>,
    pub selected_contest_id: Option<Uuid>,
}

impl From<&Scoreboard> for ContestListResponse {
    fn from(board: &Scoreboard) -> Self {
        Self {
            contests: board.contests().iter().map(ContestSummary::from).collect(),
            selected_contest_id: board.selected_contest().map(|contest| contest.id),
        }
    }
}

/// Result of a score tap.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreUpdateResponse {
    pub contest_id: Uuid,
    pub entrant: EntrantSummary,
    pub can_undo: bool,
}

/// What an undo request did.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UndoStatus {
    /// Nothing was left to undo.
    Nothing,
    /// The entrant's previous score was restored.
    Reverted,
    /// The change targeted an entrant that no longer exists; it was dropped.
    Discarded,
}

/// Response to an undo request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UndoResponse {
    pub contest_id: Uuid,
    pub status: UndoStatus,
    /// Entrant whose score was restored, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrant: Option<EntrantSummary>,
    pub can_undo: bool,
}

impl UndoResponse {
    /// Build the response from the scoreboard outcome.
    pub fn new(contest_id: Uuid, outcome: &UndoOutcome, can_undo: bool) -> Self {
        let (status, entrant) = match outcome {
            UndoOutcome::Nothing => (UndoStatus::Nothing, None),
            UndoOutcome::Reverted(entrant) => {
                (UndoStatus::Reverted, Some(EntrantSummary::from(entrant)))
            }
            UndoOutcome::Discarded(_) => (UndoStatus::Discarded, None),
        };
        Self {
            contest_id,
            status,
            entrant,
            can_undo,
        }
    }
}

/// Ranked line of a leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub entrant_id: Uuid,
    pub name: String,
    pub score: u32,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            rank: row.rank,
            entrant_id: row.entrant_id,
            name: row.name,
            score: row.score,
        }
    }
}

/// Sorted standings of one contest, as fed to printable exports.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub contest_id: Uuid,
    pub contest_name: String,
    pub accent_hex: String,
    pub rows: Vec<LeaderboardEntry>,
}

/// CSV layout selector.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CsvLayout {
    /// One block per contest, contests sorted by name.
    #[default]
    Grouped,
    /// Every entrant of every contest in a single ranking.
    Ranking,
}

/// Query parameters of the CSV export.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CsvExportQuery {
    /// Layout of the exported rows (`grouped` or `ranking`).
    #[serde(default)]
    #[param(inline)]
    pub layout: CsvLayout,
}

/// Summary of an applied backup import.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportResponse {
    pub contests: usize,
    pub selected_contest_id: Option<Uuid>,
}
