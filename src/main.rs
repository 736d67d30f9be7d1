//! Live Tally binary entrypoint wiring the durable store, REST and SSE layers.

use std::{env, net::IpAddr, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use live_tally::{
    config::AppConfig,
    dao::state_store::{
        StateStore,
        file::{FileStateStore, FileStoreConfig},
    },
    routes,
    state::{AppState, SharedState},
};

const DEFAULT_HOST: IpAddr = IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::new(FileStoreConfig::new(
        config.data_path().clone(),
    )));

    let loader = store.clone();
    let initial = tokio::task::spawn_blocking(move || loader.load())
        .await
        .context("loading persisted scoreboard")?;
    match &initial {
        Some(state) => info!(
            path = %config.data_path().display(),
            contests = state.contests.len(),
            "restored scoreboard"
        ),
        None => info!(
            path = %config.data_path().display(),
            "no usable snapshot; starting empty"
        ),
    }

    let app_state = AppState::new(config, store, initial);
    let app = build_router(app_state);

    let addr = SocketAddr::new(resolve_host(), resolve_port());
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

fn resolve_host() -> IpAddr {
    match env::var("HOST") {
        Ok(value) => value.parse().unwrap_or_else(|err| {
            warn!(host = %value, error = %err, "invalid HOST; using default");
            DEFAULT_HOST
        }),
        Err(_) => DEFAULT_HOST,
    }
}

fn resolve_port() -> u16 {
    env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
