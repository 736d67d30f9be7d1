use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::contest::{
        ContestDetail, EntrantNameRequest, EntrantSummary, ReorderEntrantsRequest,
        ScoreUpdateResponse,
    },
    error::AppError,
    services::contest_service,
    state::SharedState,
};

/// Routes editing a contest's roster and tapping scores.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/contests/{id}/entrants", post(add_entrant))
        .route("/contests/{id}/entrants/order", put(reorder_entrants))
        .route(
            "/contests/{id}/entrants/{entrant_id}",
            put(rename_entrant).delete(remove_entrant),
        )
        .route(
            "/contests/{id}/entrants/{entrant_id}/increment",
            post(increment),
        )
}

/// Add an entrant starting at zero.
#[utoipa::path(
    post,
    path = "/contests/{id}/entrants",
    tag = "entrants",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    request_body = EntrantNameRequest,
    responses(
        (status = 201, description = "Entrant added", body = EntrantSummary),
        (status = 400, description = "Blank name"),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn add_entrant(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntrantNameRequest>,
) -> Result<(StatusCode, Json<EntrantSummary>), AppError> {
    payload.validate()?;
    let entrant = contest_service::add_entrant(&state, id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(entrant)))
}

/// Reorder a contest's entrants.
#[utoipa::path(
    put,
    path = "/contests/{id}/entrants/order",
    tag = "entrants",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    request_body = ReorderEntrantsRequest,
    responses(
        (status = 200, description = "Entrants reordered", body = ContestDetail),
        (status = 400, description = "Order is not a permutation of the entrants"),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn reorder_entrants(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderEntrantsRequest>,
) -> Result<Json<ContestDetail>, AppError> {
    let detail = contest_service::reorder_entrants(&state, id, &payload.entrant_ids).await?;
    Ok(Json(detail))
}

/// Rename an entrant.
#[utoipa::path(
    put,
    path = "/contests/{id}/entrants/{entrant_id}",
    tag = "entrants",
    params(
        ("id" = Uuid, Path, description = "Contest identifier"),
        ("entrant_id" = Uuid, Path, description = "Entrant identifier")
    ),
    request_body = EntrantNameRequest,
    responses(
        (status = 200, description = "Entrant renamed", body = EntrantSummary),
        (status = 400, description = "Blank name"),
        (status = 404, description = "Unknown contest or entrant")
    )
)]
pub async fn rename_entrant(
    State(state): State<SharedState>,
    Path((id, entrant_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<EntrantNameRequest>,
) -> Result<Json<EntrantSummary>, AppError> {
    payload.validate()?;
    let entrant = contest_service::rename_entrant(&state, id, entrant_id, &payload.name).await?;
    Ok(Json(entrant))
}

/// Remove an entrant.
#[utoipa::path(
    delete,
    path = "/contests/{id}/entrants/{entrant_id}",
    tag = "entrants",
    params(
        ("id" = Uuid, Path, description = "Contest identifier"),
        ("entrant_id" = Uuid, Path, description = "Entrant identifier")
    ),
    responses(
        (status = 204, description = "Entrant removed"),
        (status = 404, description = "Unknown contest or entrant")
    )
)]
pub async fn remove_entrant(
    State(state): State<SharedState>,
    Path((id, entrant_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    contest_service::remove_entrant(&state, id, entrant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add one point to an entrant.
#[utoipa::path(
    post,
    path = "/contests/{id}/entrants/{entrant_id}/increment",
    tag = "scores",
    params(
        ("id" = Uuid, Path, description = "Contest identifier"),
        ("entrant_id" = Uuid, Path, description = "Entrant identifier")
    ),
    responses(
        (status = 200, description = "Score incremented", body = ScoreUpdateResponse),
        (status = 404, description = "Unknown contest or entrant")
    )
)]
pub async fn increment(
    State(state): State<SharedState>,
    Path((id, entrant_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ScoreUpdateResponse>, AppError> {
    let response = contest_service::increment(&state, id, entrant_id).await?;
    Ok(Json(response))
}
