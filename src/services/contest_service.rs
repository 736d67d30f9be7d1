use std::convert::Infallible;

use uuid::Uuid;

use crate::{
    dto::contest::{
        ContestDetail, ContestListResponse, CreateContestRequest, EntrantSummary,
        LeaderboardEntry, LeaderboardResponse, ScoreUpdateResponse, UndoResponse,
        UpdateContestRequest,
    },
    error::ServiceError,
    services::{leaderboard, sse_events},
    state::{
        Scoreboard, SharedState, UndoOutcome, model::AccentColor, scoreboard::ScoreboardError,
    },
};

/// List every contest along with the resolved selection.
pub async fn list_contests(state: &SharedState) -> ContestListResponse {
    state.read(|board| ContestListResponse::from(board)).await
}

/// Fetch a single contest with its entrants in display order.
pub async fn get_contest(state: &SharedState, id: Uuid) -> Result<ContestDetail, ServiceError> {
    let detail = state.read(|board| detail_of(board, id)).await?;
    Ok(detail)
}

/// Create a contest and make it the selected one.
///
/// Without an explicit accent the first palette color no other contest uses
/// is picked.
pub async fn create_contest(
    state: &SharedState,
    request: CreateContestRequest,
) -> Result<ContestDetail, ServiceError> {
    let requested = parse_accent(request.accent_hex.as_deref())?;

    let detail = state
        .mutate_and_notify(
            |board| {
                let accent = requested
                    .unwrap_or_else(|| state.config().first_unused_accent(&board.used_accents()));
                let id = board.create_contest(&request.name, accent)?.id;
                detail_of(board, id)
            },
            |detail| {
                sse_events::broadcast_contest_created(state, detail.clone());
                sse_events::broadcast_selection_changed(state, Some(detail.id));
            },
        )
        .await?;
    Ok(detail)
}

/// Rename and/or recolor a contest. Both changes apply or neither does.
pub async fn update_contest(
    state: &SharedState,
    id: Uuid,
    request: UpdateContestRequest,
) -> Result<ContestDetail, ServiceError> {
    let accent = parse_accent(request.accent_hex.as_deref())?;

    let detail = state
        .mutate_and_notify(
            |board| {
                board.contest(id)?;
                if let Some(name) = request.name.as_deref() {
                    board.rename_contest(id, name)?;
                }
                if let Some(accent) = accent {
                    board.recolor_contest(id, accent)?;
                }
                detail_of(board, id)
            },
            |detail| sse_events::broadcast_contest_updated(state, detail.clone()),
        )
        .await?;
    Ok(detail)
}

/// Delete a contest with its entrants and undo history.
pub async fn delete_contest(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    state
        .mutate_and_notify(
            |board| {
                board.delete_contest(id)?;
                Ok::<_, ScoreboardError>(board.selected_contest().map(|contest| contest.id))
            },
            |selected| sse_events::broadcast_contest_deleted(state, id, *selected),
        )
        .await?;
    Ok(())
}

/// Drop every contest.
pub async fn delete_all_contests(state: &SharedState) -> ContestListResponse {
    let Ok(list) = state
        .mutate_and_notify(
            |board| {
                board.delete_all();
                Ok::<_, Infallible>(ContestListResponse::from(&*board))
            },
            |list| sse_events::broadcast_contests_replaced(state, list.clone()),
        )
        .await;
    list
}

/// Select the contest shown on the scoring screen.
pub async fn select_contest(state: &SharedState, id: Uuid) -> Result<ContestDetail, ServiceError> {
    let detail = state
        .mutate_and_notify(
            |board| {
                board.select_contest(id)?;
                detail_of(board, id)
            },
            |_| sse_events::broadcast_selection_changed(state, Some(id)),
        )
        .await?;
    Ok(detail)
}

/// Append an entrant with a zero score.
pub async fn add_entrant(
    state: &SharedState,
    contest_id: Uuid,
    name: &str,
) -> Result<EntrantSummary, ServiceError> {
    let summary = state
        .mutate_and_notify(
            |board| {
                board
                    .add_entrant(contest_id, name)
                    .map(|entrant| EntrantSummary::from(&entrant))
            },
            |summary| sse_events::broadcast_entrant_added(state, contest_id, summary.clone()),
        )
        .await?;
    Ok(summary)
}

/// Rename an entrant, keeping its score and the undo history.
pub async fn rename_entrant(
    state: &SharedState,
    contest_id: Uuid,
    entrant_id: Uuid,
    name: &str,
) -> Result<EntrantSummary, ServiceError> {
    let summary = state
        .mutate_and_notify(
            |board| {
                board
                    .rename_entrant(contest_id, entrant_id, name)
                    .map(|entrant| EntrantSummary::from(&entrant))
            },
            |summary| sse_events::broadcast_entrant_updated(state, contest_id, summary.clone()),
        )
        .await?;
    Ok(summary)
}

/// Remove an entrant from a contest.
pub async fn remove_entrant(
    state: &SharedState,
    contest_id: Uuid,
    entrant_id: Uuid,
) -> Result<(), ServiceError> {
    state
        .mutate_and_notify(
            |board| board.remove_entrant(contest_id, entrant_id),
            |_| sse_events::broadcast_entrant_removed(state, contest_id, entrant_id),
        )
        .await?;
    Ok(())
}

/// Apply a new display order to a contest's entrants.
pub async fn reorder_entrants(
    state: &SharedState,
    contest_id: Uuid,
    entrant_ids: &[Uuid],
) -> Result<ContestDetail, ServiceError> {
    let detail = state
        .mutate_and_notify(
            |board| {
                board.reorder_entrants(contest_id, entrant_ids)?;
                detail_of(board, contest_id)
            },
            |detail| sse_events::broadcast_contest_updated(state, detail.clone()),
        )
        .await?;
    Ok(detail)
}

/// Add one point to an entrant.
pub async fn increment(
    state: &SharedState,
    contest_id: Uuid,
    entrant_id: Uuid,
) -> Result<ScoreUpdateResponse, ServiceError> {
    let response = state
        .mutate_and_notify(
            |board| {
                let entrant = board.increment(contest_id, entrant_id)?;
                Ok::<_, ScoreboardError>(ScoreUpdateResponse {
                    contest_id,
                    entrant: EntrantSummary::from(&entrant),
                    can_undo: board.can_undo(contest_id),
                })
            },
            |response| {
                sse_events::broadcast_score_changed(
                    state,
                    contest_id,
                    response.entrant.clone(),
                    response.can_undo,
                )
            },
        )
        .await?;
    Ok(response)
}

/// Revert the latest score change of a contest.
pub async fn undo(state: &SharedState, contest_id: Uuid) -> Result<UndoResponse, ServiceError> {
    let response = state
        .mutate_and_notify(
            |board| {
                let outcome = board.undo(contest_id)?;
                let can_undo = board.can_undo(contest_id);
                Ok::<_, ScoreboardError>((outcome, can_undo))
            },
            |(outcome, can_undo)| {
                if let UndoOutcome::Reverted(entrant) = outcome {
                    sse_events::broadcast_score_changed(
                        state,
                        contest_id,
                        EntrantSummary::from(entrant),
                        *can_undo,
                    );
                }
            },
        )
        .await
        .map(|(outcome, can_undo)| UndoResponse::new(contest_id, &outcome, can_undo))?;
    Ok(response)
}

/// Zero every score of a contest.
pub async fn reset_scores(
    state: &SharedState,
    contest_id: Uuid,
) -> Result<ContestDetail, ServiceError> {
    let detail = state
        .mutate_and_notify(
            |board| {
                board.reset_scores(contest_id)?;
                detail_of(board, contest_id)
            },
            |detail| sse_events::broadcast_contest_updated(state, detail.clone()),
        )
        .await?;
    Ok(detail)
}

/// Ranked standings of a contest.
pub async fn leaderboard(
    state: &SharedState,
    contest_id: Uuid,
) -> Result<LeaderboardResponse, ServiceError> {
    let response = state
        .read(|board| {
            board.contest(contest_id).map(|contest| LeaderboardResponse {
                contest_id,
                contest_name: contest.name.clone(),
                accent_hex: contest.accent.to_string(),
                rows: leaderboard::ranked(contest)
                    .into_iter()
                    .map(LeaderboardEntry::from)
                    .collect(),
            })
        })
        .await?;
    Ok(response)
}

fn detail_of(board: &Scoreboard, id: Uuid) -> Result<ContestDetail, ScoreboardError> {
    board
        .contest(id)
        .map(|contest| ContestDetail::from_board(board, contest))
}

fn parse_accent(raw: Option<&str>) -> Result<Option<AccentColor>, ServiceError> {
    raw.map(str::parse::<AccentColor>)
        .transpose()
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::state_store::memory::MemoryStateStore,
        dto::contest::UndoStatus,
        state::AppState,
    };

    fn fresh_state() -> SharedState {
        AppState::new(
            AppConfig::default(),
            Arc::new(MemoryStateStore::default()),
            None,
        )
    }

    fn create_request(name: &str, accent_hex: Option<&str>) -> CreateContestRequest {
        CreateContestRequest {
            name: name.into(),
            accent_hex: accent_hex.map(Into::into),
        }
    }

    #[tokio::test]
    async fn new_contests_take_distinct_palette_accents() {
        let state = fresh_state();

        let first = create_contest(&state, create_request("Jam A", None))
            .await
            .unwrap();
        let second = create_contest(&state, create_request("Jam B", None))
            .await
            .unwrap();

        assert_ne!(first.accent_hex, second.accent_hex);
        assert!(second.selected);

        let list = list_contests(&state).await;
        assert_eq!(list.selected_contest_id, Some(second.id));
    }

    #[tokio::test]
    async fn invalid_accent_leaves_contest_untouched() {
        let state = fresh_state();
        let contest = create_contest(&state, create_request("Jam A", Some("#123456")))
            .await
            .unwrap();

        let result = update_contest(
            &state,
            contest.id,
            UpdateContestRequest {
                name: Some("Renamed".into()),
                accent_hex: Some("blue".into()),
            },
        )
        .await;

        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        let detail = get_contest(&state, contest.id).await.unwrap();
        assert_eq!(detail.name, "Jam A");
        assert_eq!(detail.accent_hex, "#123456");
    }

    #[tokio::test]
    async fn tap_then_undo_restores_previous_score() {
        let state = fresh_state();
        let contest = create_contest(&state, create_request("Jam A", None))
            .await
            .unwrap();
        let alice = add_entrant(&state, contest.id, "Alice").await.unwrap();

        let tapped = increment(&state, contest.id, alice.id).await.unwrap();
        assert_eq!(tapped.entrant.score, 1);
        assert!(tapped.can_undo);

        let undone = undo(&state, contest.id).await.unwrap();
        assert_eq!(undone.status, UndoStatus::Reverted);
        assert_eq!(undone.entrant.unwrap().score, 0);
        assert!(!undone.can_undo);

        let again = undo(&state, contest.id).await.unwrap();
        assert_eq!(again.status, UndoStatus::Nothing);
    }

    #[tokio::test]
    async fn deleting_the_selected_contest_moves_selection() {
        let state = fresh_state();
        let first = create_contest(&state, create_request("Jam A", None))
            .await
            .unwrap();
        let second = create_contest(&state, create_request("Jam B", None))
            .await
            .unwrap();

        let mut events = state.events().subscribe();
        delete_contest(&state, second.id).await.unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("contest.deleted"));
        assert_eq!(
            list_contests(&state).await.selected_contest_id,
            Some(first.id)
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let state = fresh_state();
        assert!(matches!(
            get_contest(&state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));

        let contest = create_contest(&state, create_request("Jam A", None))
            .await
            .unwrap();
        assert!(matches!(
            increment(&state, contest.id, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn leaderboard_ranks_entrants() {
        let state = fresh_state();
        let contest = create_contest(&state, create_request("Jam A", None))
            .await
            .unwrap();
        let alice = add_entrant(&state, contest.id, "Alice").await.unwrap();
        add_entrant(&state, contest.id, "Bob").await.unwrap();
        increment(&state, contest.id, alice.id).await.unwrap();

        let board = leaderboard(&state, contest.id).await.unwrap();

        let names: Vec<_> = board.rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
        assert_eq!(board.rows[1].rank, 2);
    }

    #[tokio::test]
    async fn roster_edits_broadcast_entrant_events() {
        let state = fresh_state();
        let contest = create_contest(&state, create_request("Jam A", None))
            .await
            .unwrap();
        let mut events = state.events().subscribe();

        let alice = add_entrant(&state, contest.id, "Alice").await.unwrap();
        rename_entrant(&state, contest.id, alice.id, "Alicia")
            .await
            .unwrap();
        increment(&state, contest.id, alice.id).await.unwrap();

        let names: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .filter_map(|event| event.event)
            .collect();
        assert_eq!(names, ["entrant.added", "entrant.updated", "score.changed"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_taps_broadcast_scores_in_order() {
        const TAPS: u32 = 8;

        for _ in 0..100 {
            let state = fresh_state();
            let contest = create_contest(&state, create_request("Jam A", None))
                .await
                .unwrap();
            let alice = add_entrant(&state, contest.id, "Alice").await.unwrap();
            let mut events = state.events().subscribe();

            let taps: Vec<_> = (0..TAPS)
                .map(|_| {
                    let state = state.clone();
                    tokio::spawn(async move { increment(&state, contest.id, alice.id).await })
                })
                .collect();
            for tap in taps {
                tap.await.unwrap().unwrap();
            }

            let mut scores = Vec::new();
            while let Ok(event) = events.try_recv() {
                if event.event.as_deref() == Some("score.changed") {
                    let body: serde_json::Value = serde_json::from_str(&event.data).unwrap();
                    scores.push(body["entrant"]["score"].as_u64().unwrap());
                }
            }
            let expected: Vec<u64> = (1..=u64::from(TAPS)).collect();
            assert_eq!(scores, expected);
        }
    }
}
