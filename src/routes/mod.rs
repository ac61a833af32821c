use axum::Router;
use tower_http::services::ServeDir;

use crate::state::SharedState;

/// Annotation read/append/delete endpoints.
pub mod annotations;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health check endpoint.
pub mod health;
/// Setlist management endpoints.
pub mod setlists;
/// Song library endpoints.
pub mod songs;
/// WebSocket upgrade endpoint.
pub mod websocket;

/// Compose all route trees: the REST API under `/api`, the WebSocket and
/// health endpoints at the root, uploaded PDFs as static files, and docs.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = songs::router(state.clone())
        .merge(annotations::router())
        .merge(setlists::router());

    let docs_router = docs::router(state.clone());

    health::router()
        .merge(websocket::router())
        .nest("/api", api_router)
        .nest_service("/uploads", ServeDir::new(state.config().upload_dir()))
        .merge(docs_router)
        .with_state(state)
}
