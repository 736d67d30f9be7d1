use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::{
    dto::{contest::ContestListResponse, sse::ServerEvent},
    services::sse_events,
    state::SharedState,
};

/// Subscribe to the change stream and capture the scoreboard as it stands.
///
/// Subscribing happens under the read lock so no change can slip between the
/// snapshot and the first forwarded event.
pub async fn subscribe(
    state: &SharedState,
) -> (Option<ServerEvent>, broadcast::Receiver<ServerEvent>) {
    state
        .read(|board| {
            let receiver = state.events().subscribe();
            let initial = sse_events::scoreboard_event(ContestListResponse::from(board));
            (initial, receiver)
        })
        .await
}

/// Convert a broadcast receiver into an SSE response, sending `initial` first
/// and forwarding events until the client disconnects.
pub fn to_sse_stream(
    initial: Option<ServerEvent>,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(payload) = initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "SSE subscriber lagged behind");
                            continue;
                        }
                    }
                }
            }
        }

        info!("SSE stream disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::state_store::memory::MemoryStateStore,
        state::{AppState, model::AccentColor},
    };

    #[tokio::test]
    async fn subscription_starts_with_the_current_scoreboard() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryStateStore::default()),
            None,
        );
        state
            .mutate(|board| board.create_contest("Jam A", AccentColor::default()).map(|_| ()))
            .await
            .unwrap();

        let (initial, mut receiver) = subscribe(&state).await;

        let initial = initial.unwrap();
        assert_eq!(initial.event.as_deref(), Some("scoreboard"));
        let body: serde_json::Value = serde_json::from_str(&initial.data).unwrap();
        assert_eq!(body["contests"][0]["name"], "Jam A");

        sse_events::broadcast_selection_changed(&state, None);
        let next = receiver.recv().await.unwrap();
        assert_eq!(next.event.as_deref(), Some("selection.changed"));
    }
}
