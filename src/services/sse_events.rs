use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        contest::{ContestDetail, ContestListResponse, EntrantSummary},
        sse::{
            ContestChangedEvent, ContestDeletedEvent, EntrantChangedEvent, EntrantRemovedEvent,
            ScoreChangedEvent, ScoreboardEvent, SelectionChangedEvent, ServerEvent,
        },
    },
    state::SharedState,
};

const EVENT_SCOREBOARD: &str = "scoreboard";
const EVENT_CONTEST_CREATED: &str = "contest.created";
const EVENT_CONTEST_UPDATED: &str = "contest.updated";
const EVENT_CONTEST_DELETED: &str = "contest.deleted";
const EVENT_CONTESTS_REPLACED: &str = "contests.replaced";
const EVENT_ENTRANT_ADDED: &str = "entrant.added";
const EVENT_ENTRANT_UPDATED: &str = "entrant.updated";
const EVENT_ENTRANT_REMOVED: &str = "entrant.removed";
const EVENT_SCORE_CHANGED: &str = "score.changed";
const EVENT_SELECTION_CHANGED: &str = "selection.changed";

/// Build the snapshot event sent first on every new stream.
pub fn scoreboard_event(list: ContestListResponse) -> Option<ServerEvent> {
    match ServerEvent::json(Some(EVENT_SCOREBOARD.to_string()), &ScoreboardEvent(list)) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize scoreboard SSE payload");
            None
        }
    }
}

/// Broadcast a newly created contest.
pub fn broadcast_contest_created(state: &SharedState, contest: ContestDetail) {
    send_event(state, EVENT_CONTEST_CREATED, &ContestChangedEvent { contest });
}

/// Broadcast a contest whose name, accent, order or scores changed as a whole.
pub fn broadcast_contest_updated(state: &SharedState, contest: ContestDetail) {
    send_event(state, EVENT_CONTEST_UPDATED, &ContestChangedEvent { contest });
}

/// Broadcast that a contest has been deleted along with the new selection.
pub fn broadcast_contest_deleted(
    state: &SharedState,
    contest_id: Uuid,
    selected_contest_id: Option<Uuid>,
) {
    let payload = ContestDeletedEvent {
        contest_id,
        selected_contest_id,
    };
    send_event(state, EVENT_CONTEST_DELETED, &payload);
}

/// Broadcast that every contest has been swapped (import or delete all).
pub fn broadcast_contests_replaced(state: &SharedState, list: ContestListResponse) {
    send_event(state, EVENT_CONTESTS_REPLACED, &ScoreboardEvent(list));
}

/// Broadcast a new entrant.
pub fn broadcast_entrant_added(state: &SharedState, contest_id: Uuid, entrant: EntrantSummary) {
    let payload = EntrantChangedEvent {
        contest_id,
        entrant,
    };
    send_event(state, EVENT_ENTRANT_ADDED, &payload);
}

/// Broadcast a renamed entrant.
pub fn broadcast_entrant_updated(state: &SharedState, contest_id: Uuid, entrant: EntrantSummary) {
    let payload = EntrantChangedEvent {
        contest_id,
        entrant,
    };
    send_event(state, EVENT_ENTRANT_UPDATED, &payload);
}

/// Broadcast that an entrant has been removed.
pub fn broadcast_entrant_removed(state: &SharedState, contest_id: Uuid, entrant_id: Uuid) {
    let payload = EntrantRemovedEvent {
        contest_id,
        entrant_id,
    };
    send_event(state, EVENT_ENTRANT_REMOVED, &payload);
}

/// Broadcast a score movement caused by a tap or an undo.
pub fn broadcast_score_changed(
    state: &SharedState,
    contest_id: Uuid,
    entrant: EntrantSummary,
    can_undo: bool,
) {
    let payload = ScoreChangedEvent {
        contest_id,
        entrant,
        can_undo,
    };
    send_event(state, EVENT_SCORE_CHANGED, &payload);
}

/// Broadcast the selected contest.
pub fn broadcast_selection_changed(state: &SharedState, selected_contest_id: Option<Uuid>) {
    send_event(
        state,
        EVENT_SELECTION_CHANGED,
        &SelectionChangedEvent {
            selected_contest_id,
        },
    );
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
