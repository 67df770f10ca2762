use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use routes::{api, pages};

// --- Public Re-exports ---

pub use auth::{JwtSessionProvider, SessionProvider, SessionState, StaticSessionProvider};
pub use config::AppConfig;
pub use gate::{AccessGate, Decision, RouteCategory, RouteTable};
pub use models::AuthContext;

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::get_session),
    components(schemas(models::AuthContext)),
    tags((name = "lending-gate", description = "Book lending access gate"))
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, built explicitly in `main` and cloned into every handler.
/// There is no process-wide session client; the provider lives here.
#[derive(Clone)]
pub struct AppState {
    /// Resolves the caller's `AuthContext` from request headers.
    pub sessions: SessionState,
    /// The access-control decision function.
    pub gate: AccessGate,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// State for the application's route table.
    pub fn new(sessions: SessionState, config: AppConfig) -> Self {
        Self {
            sessions,
            gate: AccessGate::default(),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, wraps all of them in the access gate and adds the global layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // The gate sits on the merged router so it sees every path, including the
    // fallback; the path router inside it decides which ones to skip.
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api::api_routes())
        .merge(pages::page_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::access_gate,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, correlated by the `x-request-id` set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
