use crate::{AppState, handlers};
use axum::Router;

/// Page Router Module
///
/// There is no per-page routing on the server: any path the gate allows, listed in a route
/// table or not, is answered with the application shell.
pub fn page_routes() -> Router<AppState> {
    Router::new().fallback(handlers::app_shell)
}
