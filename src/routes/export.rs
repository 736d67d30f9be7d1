use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::{
    dto::contest::{CsvExportQuery, CsvLayout, ImportResponse},
    error::AppError,
    services::export_service,
    state::SharedState,
};

/// Routes serving downloads and restoring backups.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/export/csv", get(export_csv))
        .route("/backup", get(download_backup).post(restore_backup))
}

/// Download every contest as CSV.
#[utoipa::path(
    get,
    path = "/export/csv",
    tag = "export",
    params(CsvExportQuery),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String)
    )
)]
pub async fn export_csv(
    State(state): State<SharedState>,
    Query(query): Query<CsvExportQuery>,
) -> impl IntoResponse {
    let csv = export_service::export_csv(&state, query.layout).await;
    let filename = match query.layout {
        CsvLayout::Grouped => "scores-grouped.csv",
        CsvLayout::Ranking => "scores-ranking.csv",
    };
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
}

/// Download a JSON backup of every contest.
#[utoipa::path(
    get,
    path = "/backup",
    tag = "export",
    responses(
        (status = 200, description = "JSON backup", content_type = "application/json", body = String)
    )
)]
pub async fn download_backup(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let json = export_service::export_backup(&state).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"scoreboard-backup.json\"",
            ),
        ],
        json,
    ))
}

/// Replace every contest with an uploaded backup.
#[utoipa::path(
    post,
    path = "/backup",
    tag = "export",
    request_body(content = String, content_type = "application/json", description = "Backup document or bare contest array"),
    responses(
        (status = 200, description = "Backup imported", body = ImportResponse),
        (status = 400, description = "Malformed backup or unsupported schema")
    )
)]
pub async fn restore_backup(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, AppError> {
    let response = export_service::import_backup(&state, &body).await?;
    Ok(Json(response))
}
