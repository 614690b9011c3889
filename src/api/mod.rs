//! API layer -- axum routes, handlers, and middleware.

mod routes;
pub mod state;

use self::state::AppState;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router with all API routes.
///
/// When `dashboard.static_dir` is configured, unmatched paths are served
/// from it; otherwise they get a plain 404.
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.dashboard.static_dir.clone();
    let app = Router::new().nest("/api/v1", routes::api_routes());
    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.fallback(fallback),
    };
    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback() -> (axum::http::StatusCode, &'static str) {
    (axum::http::StatusCode::NOT_FOUND, "not found")
}
