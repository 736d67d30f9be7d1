use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

/// Number of score changes that can be reverted per contest.
pub const MAX_UNDO_DEPTH: usize = 10;

/// A reversible score change. Session-only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoEntry {
    pub contest_id: Uuid,
    pub entrant_id: Uuid,
    pub previous_score: u32,
    pub new_score: u32,
}

/// Bounded per-contest stacks of [`UndoEntry`].
///
/// The ledger never touches entrants; callers apply the reverse mutation.
#[derive(Debug, Default, Clone)]
pub struct UndoLedger {
    stacks: HashMap<Uuid, VecDeque<UndoEntry>>,
}

impl UndoLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a score change, evicting the oldest entry past [`MAX_UNDO_DEPTH`].
    pub fn record_increment(
        &mut self,
        contest_id: Uuid,
        entrant_id: Uuid,
        previous_score: u32,
        new_score: u32,
    ) {
        let stack = self.stacks.entry(contest_id).or_default();
        stack.push_back(UndoEntry {
            contest_id,
            entrant_id,
            previous_score,
            new_score,
        });
        while stack.len() > MAX_UNDO_DEPTH {
            stack.pop_front();
        }
    }

    /// Pop the most recent entry for `contest_id`.
    pub fn undo_last(&mut self, contest_id: Uuid) -> Option<UndoEntry> {
        let stack = self.stacks.get_mut(&contest_id)?;
        let entry = stack.pop_back();
        if stack.is_empty() {
            self.stacks.remove(&contest_id);
        }
        entry
    }

    /// Drop every entry recorded for `contest_id`.
    pub fn clear(&mut self, contest_id: Uuid) {
        self.stacks.remove(&contest_id);
    }

    /// Drop every entry for every contest.
    pub fn clear_all(&mut self) {
        self.stacks.clear();
    }

    /// Whether `contest_id` has anything to revert.
    pub fn can_undo(&self, contest_id: Uuid) -> bool {
        self.stacks
            .get(&contest_id)
            .is_some_and(|stack| !stack.is_empty())
    }

    /// Number of revertible entries for `contest_id`.
    pub fn depth(&self, contest_id: Uuid) -> usize {
        self.stacks.get(&contest_id).map_or(0, VecDeque::len)
    }
}
