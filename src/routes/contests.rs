use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::contest::{
        ContestDetail, ContestListResponse, CreateContestRequest, LeaderboardResponse,
        UndoResponse, UpdateContestRequest,
    },
    error::AppError,
    services::contest_service,
    state::SharedState,
};

/// Routes handling the contest lifecycle, selection, undo and standings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/contests",
            get(list_contests)
                .post(create_contest)
                .delete(delete_all_contests),
        )
        .route(
            "/contests/{id}",
            get(get_contest).put(update_contest).delete(delete_contest),
        )
        .route("/contests/{id}/select", post(select_contest))
        .route("/contests/{id}/undo", post(undo))
        .route("/contests/{id}/scores/reset", post(reset_scores))
        .route("/contests/{id}/leaderboard", get(leaderboard))
}

/// List every contest and the currently selected one.
#[utoipa::path(
    get,
    path = "/contests",
    tag = "contests",
    responses(
        (status = 200, description = "Contest list", body = ContestListResponse)
    )
)]
pub async fn list_contests(State(state): State<SharedState>) -> Json<ContestListResponse> {
    Json(contest_service::list_contests(&state).await)
}

/// Create a contest and select it.
#[utoipa::path(
    post,
    path = "/contests",
    tag = "contests",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Contest created", body = ContestDetail),
        (status = 400, description = "Invalid name or accent")
    )
)]
pub async fn create_contest(
    State(state): State<SharedState>,
    Json(payload): Json<CreateContestRequest>,
) -> Result<(StatusCode, Json<ContestDetail>), AppError> {
    payload.validate()?;
    let detail = contest_service::create_contest(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Delete every contest.
#[utoipa::path(
    delete,
    path = "/contests",
    tag = "contests",
    responses(
        (status = 200, description = "All contests deleted", body = ContestListResponse)
    )
)]
pub async fn delete_all_contests(State(state): State<SharedState>) -> Json<ContestListResponse> {
    Json(contest_service::delete_all_contests(&state).await)
}

/// Fetch a contest with its entrants.
#[utoipa::path(
    get,
    path = "/contests/{id}",
    tag = "contests",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    responses(
        (status = 200, description = "Contest detail", body = ContestDetail),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn get_contest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContestDetail>, AppError> {
    let detail = contest_service::get_contest(&state, id).await?;
    Ok(Json(detail))
}

/// Rename and/or recolor a contest.
#[utoipa::path(
    put,
    path = "/contests/{id}",
    tag = "contests",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    request_body = UpdateContestRequest,
    responses(
        (status = 200, description = "Contest updated", body = ContestDetail),
        (status = 400, description = "Invalid name or accent"),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn update_contest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContestRequest>,
) -> Result<Json<ContestDetail>, AppError> {
    payload.validate()?;
    let detail = contest_service::update_contest(&state, id, payload).await?;
    Ok(Json(detail))
}

/// Delete a contest with its entrants.
#[utoipa::path(
    delete,
    path = "/contests/{id}",
    tag = "contests",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    responses(
        (status = 204, description = "Contest deleted"),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn delete_contest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    contest_service::delete_contest(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Make a contest the one shown on the scoring screen.
#[utoipa::path(
    post,
    path = "/contests/{id}/select",
    tag = "contests",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    responses(
        (status = 200, description = "Contest selected", body = ContestDetail),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn select_contest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContestDetail>, AppError> {
    let detail = contest_service::select_contest(&state, id).await?;
    Ok(Json(detail))
}

/// Revert the latest score change of a contest.
#[utoipa::path(
    post,
    path = "/contests/{id}/undo",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    responses(
        (status = 200, description = "Undo outcome", body = UndoResponse),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn undo(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UndoResponse>, AppError> {
    let response = contest_service::undo(&state, id).await?;
    Ok(Json(response))
}

/// Zero every score of a contest.
#[utoipa::path(
    post,
    path = "/contests/{id}/scores/reset",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    responses(
        (status = 200, description = "Scores reset", body = ContestDetail),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn reset_scores(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContestDetail>, AppError> {
    let detail = contest_service::reset_scores(&state, id).await?;
    Ok(Json(detail))
}

/// Ranked standings of a contest.
#[utoipa::path(
    get,
    path = "/contests/{id}/leaderboard",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    responses(
        (status = 200, description = "Leaderboard", body = LeaderboardResponse),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let response = contest_service::leaderboard(&state, id).await?;
    Ok(Json(response))
}
