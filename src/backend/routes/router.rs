/**
 * Router Configuration
 *
 * Combines the public and protected routes into a single Axum router.
 *
 * # Layers
 *
 * - The auth middleware is a `route_layer` on the protected routes only, so
 *   the health check and unknown paths never reach it.
 * - `TraceLayer` wraps everything.
 */

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::backend::document::handlers::open_document;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;
use crate::backend::session::handlers::{handle_command, open_session};

/// Liveness check
///
/// Always `true`. Needs no credentials, session or token.
pub async fn health_check() -> Json<bool> {
    Json(true)
}

async fn not_found() -> BackendError {
    BackendError::handler(StatusCode::NOT_FOUND, "Not found")
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = Router::new()
        .route("/doc/{doc_id}/open", get(open_document))
        .route("/doc/{doc_id}/session", post(open_session))
        .route("/doc/{doc_id}/session/{session_id}", post(handle_command))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/healthcheck", get(health_check))
        .merge(protected)
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}
