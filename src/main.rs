//! MasterSheet backend binary entrypoint wiring REST, WebSocket, and SQLite
//! layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod ink;
mod routes;
mod services;
mod state;

use config::AppConfig;
use dao::sheet_store::{
    SheetStore,
    sqlite::{SqliteConfig, SqliteSheetStore},
};
use services::{library_service, storage_supervisor};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    tokio::spawn(run_sqlite_supervisor(app_state.clone()));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(4000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Supervise the SQLite connection, re-importing orphaned uploads on each
/// fresh connect so PDFs restored by hand reappear in the library.
async fn run_sqlite_supervisor(state: SharedState) {
    let sqlite_config = SqliteConfig {
        database_url: state.config().database_url().to_string(),
        ..SqliteConfig::default()
    };
    let upload_dir = state.config().upload_dir().clone();

    storage_supervisor::run(state, move || {
        let sqlite_config = sqlite_config.clone();
        let upload_dir = upload_dir.clone();
        async move {
            let store: Arc<dyn SheetStore> =
                Arc::new(SqliteSheetStore::connect(&sqlite_config).await?);

            match library_service::reimport_orphan_uploads(&store, &upload_dir).await {
                Ok(0) => {}
                Ok(count) => info!(count, "re-imported orphaned uploads"),
                Err(err) => warn!(error = %err, "orphaned upload scan failed"),
            }

            Ok(store)
        }
    })
    .await;
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

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
