use axum::{Json, http::Uri, response::Html};

use crate::models::AuthContext;

// --- API Handlers (excluded from the gate by the /api prefix) ---

/// health
///
/// Liveness probe for load balancers.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_session
///
/// Reports how the session provider sees the caller. The frontend uses it to decide which
/// navigation to show; an invalid or missing session reads as anonymous rather than 401.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Resolved session state", body = AuthContext))
)]
pub async fn get_session(auth: AuthContext) -> Json<AuthContext> {
    Json(auth)
}

// --- Page Shell ---

/// app_shell
///
/// Every page request the gate lets through lands here. Rendering belongs to the frontend;
/// the shell only carries the requested path and the session flags it boots from.
pub async fn app_shell(uri: Uri, auth: AuthContext) -> Html<String> {
    Html(format!(
        concat!(
            "<!doctype html>\n",
            "<html lang=\"en\">\n",
            "<head><meta charset=\"utf-8\"><title>Book Lending</title></head>\n",
            "<body data-path=\"{path}\" data-logged-in=\"{logged_in}\" data-parent=\"{parent}\">\n",
            "<div id=\"root\"></div>\n",
            "</body>\n",
            "</html>\n"
        ),
        path = escape_attr(uri.path()),
        logged_in = auth.is_logged_in,
        parent = auth.is_parent,
    ))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
