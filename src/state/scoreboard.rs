//! In-memory application state: every contest, the selection, and the undo
//! ledger. All mutations are synchronous; [`crate::state::AppState`] runs them
//! under a single write lock and persists a snapshot afterwards.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{PersistedState, SCHEMA_VERSION},
    state::{
        model::{AccentColor, Contest, Entrant},
        undo::{UndoEntry, UndoLedger},
    },
};

/// Errors raised by scoreboard mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreboardError {
    /// No contest carries the identifier.
    #[error("contest `{0}` not found")]
    ContestNotFound(Uuid),
    /// The contest exists but has no such entrant.
    #[error("entrant `{entrant_id}` not found in contest `{contest_id}`")]
    EntrantNotFound { contest_id: Uuid, entrant_id: Uuid },
    /// A contest or entrant name was blank.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
    /// Reorder request is not a permutation of the current entrants.
    #[error("entrant order must list every entrant of contest `{0}` exactly once")]
    InvalidOrder(Uuid),
}

/// Result of reverting the last score change of a contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// Nothing was recorded for the contest.
    Nothing,
    /// The entrant's previous score was restored.
    Reverted(Entrant),
    /// The entry was consumed but its entrant no longer exists.
    Discarded(UndoEntry),
}

/// Sole owner of all contest and entrant data for the running process.
#[derive(Debug, Default, Clone)]
pub struct Scoreboard {
    contests: Vec<Contest>,
    selected_contest_id: Option<Uuid>,
    ledger: UndoLedger,
}

impl Scoreboard {
    /// Empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the in-memory state from a persisted snapshot.
    ///
    /// The selection is kept verbatim; [`Scoreboard::selected_contest`]
    /// resolves dangling references.
    pub fn from_persisted(state: PersistedState) -> Self {
        Self {
            contests: state.contests.into_iter().map(Into::into).collect(),
            selected_contest_id: state.selected_contest_id,
            ledger: UndoLedger::new(),
        }
    }

    /// Capture a complete copy suitable for serialisation.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            schema_version: SCHEMA_VERSION,
            contests: self.contests.iter().cloned().map(Into::into).collect(),
            selected_contest_id: self.selected_contest_id,
        }
    }

    /// Contests in insertion order.
    pub fn contests(&self) -> &[Contest] {
        &self.contests
    }

    /// Look up a contest.
    pub fn contest(&self, id: Uuid) -> Result<&Contest, ScoreboardError> {
        self.contests
            .iter()
            .find(|contest| contest.id == id)
            .ok_or(ScoreboardError::ContestNotFound(id))
    }

    fn contest_mut(&mut self, id: Uuid) -> Result<&mut Contest, ScoreboardError> {
        self.contests
            .iter_mut()
            .find(|contest| contest.id == id)
            .ok_or(ScoreboardError::ContestNotFound(id))
    }

    fn entrant_mut(
        &mut self,
        contest_id: Uuid,
        entrant_id: Uuid,
    ) -> Result<&mut Entrant, ScoreboardError> {
        self.contest_mut(contest_id)?
            .entrant_mut(entrant_id)
            .ok_or(ScoreboardError::EntrantNotFound {
                contest_id,
                entrant_id,
            })
    }

    /// The selected contest, falling back to the first one when the stored
    /// selection is missing or dangling.
    pub fn selected_contest(&self) -> Option<&Contest> {
        self.selected_contest_id
            .and_then(|id| self.contest(id).ok())
            .or_else(|| self.contests.first())
    }

    /// Accents already assigned to a contest.
    pub fn used_accents(&self) -> Vec<AccentColor> {
        self.contests.iter().map(|contest| contest.accent).collect()
    }

    /// Whether the contest has a score change to revert.
    pub fn can_undo(&self, contest_id: Uuid) -> bool {
        self.ledger.can_undo(contest_id)
    }

    // -----------------------------------------------------------------------
    // Contest lifecycle
    // -----------------------------------------------------------------------

    /// Append a new contest and select it.
    pub fn create_contest(
        &mut self,
        name: &str,
        accent: AccentColor,
    ) -> Result<&Contest, ScoreboardError> {
        let contest = Contest::new(normalized_name(name, "contest")?, accent);
        self.selected_contest_id = Some(contest.id);
        self.contests.push(contest);
        Ok(&self.contests[self.contests.len() - 1])
    }

    /// Rename a contest. Scores and undo history are untouched.
    pub fn rename_contest(&mut self, id: Uuid, name: &str) -> Result<&Contest, ScoreboardError> {
        let name = normalized_name(name, "contest")?;
        let contest = self.contest_mut(id)?;
        contest.name = name;
        Ok(contest)
    }

    /// Change a contest's accent color.
    pub fn recolor_contest(
        &mut self,
        id: Uuid,
        accent: AccentColor,
    ) -> Result<&Contest, ScoreboardError> {
        let contest = self.contest_mut(id)?;
        contest.accent = accent;
        Ok(contest)
    }

    /// Remove a contest with its entrants and undo history.
    pub fn delete_contest(&mut self, id: Uuid) -> Result<Contest, ScoreboardError> {
        let index = self
            .contests
            .iter()
            .position(|contest| contest.id == id)
            .ok_or(ScoreboardError::ContestNotFound(id))?;
        let removed = self.contests.remove(index);
        self.ledger.clear(id);

        if self.selected_contest_id == Some(id) {
            self.selected_contest_id = self.contests.first().map(|contest| contest.id);
        }
        Ok(removed)
    }

    /// Mark a contest as selected.
    pub fn select_contest(&mut self, id: Uuid) -> Result<&Contest, ScoreboardError> {
        self.contest(id)?;
        self.selected_contest_id = Some(id);
        self.contest(id)
    }

    /// Swap every contest for an imported set.
    pub fn replace_all(&mut self, contests: Vec<Contest>, selected_contest_id: Option<Uuid>) {
        self.contests = contests;
        self.selected_contest_id = selected_contest_id;
        self.ledger.clear_all();
    }

    /// Reset to the empty state.
    pub fn delete_all(&mut self) {
        self.replace_all(Vec::new(), None);
    }

    // -----------------------------------------------------------------------
    // Entrants (structural edits clear the contest's undo history)
    // -----------------------------------------------------------------------

    /// Append an entrant starting at zero.
    pub fn add_entrant(&mut self, contest_id: Uuid, name: &str) -> Result<Entrant, ScoreboardError> {
        let name = normalized_name(name, "entrant")?;
        let contest = self.contest_mut(contest_id)?;
        let entrant = Entrant::new(name);
        contest.entrants.push(entrant.clone());
        self.ledger.clear(contest_id);
        Ok(entrant)
    }

    /// Rename an entrant. Not a structural change.
    pub fn rename_entrant(
        &mut self,
        contest_id: Uuid,
        entrant_id: Uuid,
        name: &str,
    ) -> Result<Entrant, ScoreboardError> {
        let name = normalized_name(name, "entrant")?;
        let entrant = self.entrant_mut(contest_id, entrant_id)?;
        entrant.name = name;
        Ok(entrant.clone())
    }

    /// Remove an entrant from its contest.
    pub fn remove_entrant(
        &mut self,
        contest_id: Uuid,
        entrant_id: Uuid,
    ) -> Result<Entrant, ScoreboardError> {
        let contest = self.contest_mut(contest_id)?;
        let index = contest
            .entrants
            .iter()
            .position(|entrant| entrant.id == entrant_id)
            .ok_or(ScoreboardError::EntrantNotFound {
                contest_id,
                entrant_id,
            })?;
        let removed = contest.entrants.remove(index);
        self.ledger.clear(contest_id);
        Ok(removed)
    }

    /// Reorder entrants to match `ordered_ids`, which must be a permutation of
    /// the current entrant ids.
    pub fn reorder_entrants(
        &mut self,
        contest_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<&Contest, ScoreboardError> {
        let contest = self.contest_mut(contest_id)?;

        let unique: HashSet<Uuid> = ordered_ids.iter().copied().collect();
        if unique.len() != ordered_ids.len()
            || ordered_ids.len() != contest.entrants.len()
            || ordered_ids.iter().any(|id| contest.entrant(*id).is_none())
        {
            return Err(ScoreboardError::InvalidOrder(contest_id));
        }

        let mut remaining = std::mem::take(&mut contest.entrants);
        for id in ordered_ids {
            if let Some(index) = remaining.iter().position(|entrant| entrant.id == *id) {
                contest.entrants.push(remaining.swap_remove(index));
            }
        }

        self.ledger.clear(contest_id);
        self.contest(contest_id)
    }

    // -----------------------------------------------------------------------
    // Scores
    // -----------------------------------------------------------------------

    /// Add one point and record the change for undo.
    pub fn increment(
        &mut self,
        contest_id: Uuid,
        entrant_id: Uuid,
    ) -> Result<Entrant, ScoreboardError> {
        let entrant = self.entrant_mut(contest_id, entrant_id)?;
        let previous = entrant.score;
        entrant.score = previous.saturating_add(1);
        let updated = entrant.clone();

        self.ledger
            .record_increment(contest_id, entrant_id, previous, updated.score);
        Ok(updated)
    }

    /// Revert the latest recorded score change of a contest.
    ///
    /// The entry is consumed even when its entrant has since been removed.
    pub fn undo(&mut self, contest_id: Uuid) -> Result<UndoOutcome, ScoreboardError> {
        self.contest(contest_id)?;
        let Some(entry) = self.ledger.undo_last(contest_id) else {
            return Ok(UndoOutcome::Nothing);
        };

        match self.entrant_mut(contest_id, entry.entrant_id) {
            Ok(entrant) => {
                entrant.score = entry.previous_score;
                Ok(UndoOutcome::Reverted(entrant.clone()))
            }
            Err(_) => Ok(UndoOutcome::Discarded(entry)),
        }
    }

    /// Zero every score of a contest and drop its undo history.
    pub fn reset_scores(&mut self, contest_id: Uuid) -> Result<&Contest, ScoreboardError> {
        let contest = self.contest_mut(contest_id)?;
        contest
            .entrants
            .iter_mut()
            .for_each(|entrant| entrant.score = 0);
        self.ledger.clear(contest_id);
        self.contest(contest_id)
    }
}

fn normalized_name(name: &str, kind: &'static str) -> Result<String, ScoreboardError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ScoreboardError::EmptyName(kind));
    }
    Ok(trimmed.to_string())
}
