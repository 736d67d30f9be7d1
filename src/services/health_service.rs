use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness along with the number of contests held in memory.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let contests = state.read(|board| board.contests().len()).await;
    HealthResponse::ok(contests)
}
