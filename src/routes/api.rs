use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// API Router Module
///
/// Thin JSON endpoints. The `/api` prefix is on the path router's exclusion list, so these
/// handlers resolve the session themselves through the `AuthContext` extractor.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        .route("/api/health", get(handlers::health))
        // GET /api/session
        // The caller's `{isLoggedIn, isParent}` as the session provider resolves it.
        .route("/api/session", get(handlers::get_session))
}
