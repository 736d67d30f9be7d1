use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status (always "ok" once the server answers).
    pub status: String,
    /// Number of contests currently held in memory.
    pub contests: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(contests: usize) -> Self {
        Self {
            status: "ok".to_string(),
            contests,
        }
    }
}
