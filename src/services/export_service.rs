use std::convert::Infallible;

use tracing::info;

use crate::{
    dto::contest::{ContestListResponse, CsvLayout, ImportResponse},
    error::ServiceError,
    services::{backup, leaderboard, sse_events},
    state::SharedState,
};

/// Render every contest as CSV in the requested layout.
pub async fn export_csv(state: &SharedState, layout: CsvLayout) -> String {
    state
        .read(|board| match layout {
            CsvLayout::Grouped => leaderboard::grouped_csv(board.contests()),
            CsvLayout::Ranking => leaderboard::ranking_csv(board.contests()),
        })
        .await
}

/// Serialise the whole scoreboard as a JSON backup document.
pub async fn export_backup(state: &SharedState) -> Result<String, ServiceError> {
    state
        .read(backup::export_backup)
        .await
        .map_err(|err| ServiceError::Internal(format!("failed to encode backup: {err}")))
}

/// Replace every contest with the content of a backup payload.
///
/// The payload is fully decoded before the scoreboard is touched; a rejected
/// payload leaves the current contests as they are.
pub async fn import_backup(
    state: &SharedState,
    payload: &[u8],
) -> Result<ImportResponse, ServiceError> {
    let imported = backup::parse_backup(payload)?;
    let contest_count = imported.contests.len();

    let Ok(list) = state
        .mutate_and_notify(
            |board| {
                board.replace_all(imported.contests, imported.selected_contest_id);
                Ok::<_, Infallible>(ContestListResponse::from(&*board))
            },
            |list| sse_events::broadcast_contests_replaced(state, list.clone()),
        )
        .await;

    info!(contests = contest_count, "backup imported");
    Ok(ImportResponse {
        contests: contest_count,
        selected_contest_id: list.selected_contest_id,
    })
}
