use axum::Router;

use crate::state::SharedState;

pub mod contests;
pub mod docs;
pub mod entrants;
pub mod export;
pub mod health;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(contests::router())
        .merge(entrants::router())
        .merge(export::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
