use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::contest::{ContestDetail, ContestListResponse, EntrantSummary};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already encoded data field.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// First event of every stream: the full contest list and selection.
pub struct ScoreboardEvent(pub ContestListResponse);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a contest is created, renamed, recoloured or its roster changes.
pub struct ContestChangedEvent {
    pub contest: ContestDetail,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a contest has been deleted.
pub struct ContestDeletedEvent {
    pub contest_id: Uuid,
    /// Selection after the deletion.
    pub selected_contest_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an entrant is added or renamed.
pub struct EntrantChangedEvent {
    pub contest_id: Uuid,
    pub entrant: EntrantSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an entrant has been removed.
pub struct EntrantRemovedEvent {
    pub contest_id: Uuid,
    pub entrant_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a score moves, carrying the undo availability.
pub struct ScoreChangedEvent {
    pub contest_id: Uuid,
    pub entrant: EntrantSummary,
    pub can_undo: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the selected contest changes.
pub struct SelectionChangedEvent {
    pub selected_contest_id: Option<Uuid>,
}
