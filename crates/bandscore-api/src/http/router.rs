//! Axum router configuration with middleware.
//!
//! API routes are under `/api/v1/`; the wizard page is served at `/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/tasks", get(handlers::tasks::list_tasks))
        .route("/word-count", post(handlers::word_count::word_count))
        // Wizard sessions
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route("/sessions/{id}/task", post(handlers::session::select_task))
        .route("/sessions/{id}/draft", put(handlers::session::update_draft))
        .route("/sessions/{id}/evaluate", post(handlers::session::evaluate))
        .route("/sessions/{id}/back", post(handlers::session::back))
        .route("/sessions/{id}/restart", post(handlers::session::restart))
        .route("/sessions/{id}/report", get(handlers::session::report));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/", get(handlers::page::index))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
