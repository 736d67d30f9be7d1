use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Live Tally server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::contests::list_contests,
        crate::routes::contests::create_contest,
        crate::routes::contests::delete_all_contests,
        crate::routes::contests::get_contest,
        crate::routes::contests::update_contest,
        crate::routes::contests::delete_contest,
        crate::routes::contests::select_contest,
        crate::routes::contests::undo,
        crate::routes::contests::reset_scores,
        crate::routes::contests::leaderboard,
        crate::routes::entrants::add_entrant,
        crate::routes::entrants::reorder_entrants,
        crate::routes::entrants::rename_entrant,
        crate::routes::entrants::remove_entrant,
        crate::routes::entrants::increment,
        crate::routes::export::export_csv,
        crate::routes::export::download_backup,
        crate::routes::export::restore_backup,
        crate::routes::sse::scoreboard_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::contest::CreateContestRequest,
            crate::dto::contest::UpdateContestRequest,
            crate::dto::contest::EntrantNameRequest,
            crate::dto::contest::ReorderEntrantsRequest,
            crate::dto::contest::EntrantSummary,
            crate::dto::contest::ContestSummary,
            crate::dto::contest::ContestDetail,
            crate::dto::contest::ContestListResponse,
            crate::dto::contest::ScoreUpdateResponse,
            crate::dto::contest::UndoStatus,
            crate::dto::contest::UndoResponse,
            crate::dto::contest::LeaderboardEntry,
            crate::dto::contest::LeaderboardResponse,
            crate::dto::contest::CsvLayout,
            crate::dto::contest::ImportResponse,
            crate::dto::sse::ScoreboardEvent,
            crate::dto::sse::ContestChangedEvent,
            crate::dto::sse::ContestDeletedEvent,
            crate::dto::sse::EntrantChangedEvent,
            crate::dto::sse::EntrantRemovedEvent,
            crate::dto::sse::ScoreChangedEvent,
            crate::dto::sse::SelectionChangedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "contests", description = "Contest lifecycle and selection"),
        (name = "entrants", description = "Roster editing"),
        (name = "scores", description = "Score taps, undo and standings"),
        (name = "export", description = "CSV exports and JSON backups"),
        (name = "sse", description = "Server-sent change notifications"),
    )
)]
pub struct ApiDoc;
