use std::{borrow::Cow, sync::LazyLock};

use axum::{
    extract::{Request, State},
    http::{Uri, uri::PathAndQuery},
    middleware::Next,
    response::Response,
};
use regex::Regex;

use crate::AppState;

/// Paths the gate never sees: the API namespace, framework static and image assets,
/// the favicon, and image files. The `.` in `favicon.ico` is a wildcard and the
/// prefixes carry no segment boundary (`/apiary` is excluded as well).
static EXCLUDED_PATHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/(?:api|_next/static|_next/image|favicon.ico|.*\.(?:svg|png|jpg|jpeg|gif|webp)$)",
    )
    .expect("exclusion pattern is a valid regex")
});

/// is_excluded
///
/// True when the path router skips the gate for `path`. Paths that do not start with `/`
/// never match the router and are skipped too.
pub fn is_excluded(path: &str) -> bool {
    !path.starts_with('/') || EXCLUDED_PATHS.is_match(path)
}

pub fn should_run_gate(path: &str) -> bool {
    !is_excluded(path)
}

fn is_single_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_double_dot(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

/// normalize_path
///
/// Resolves `.` and `..` segments, including their percent-encoded spellings, the way a
/// browser's URL parser does before a path ever reaches routing. `..` at the root stays at
/// the root, and a trailing `.` or `..` leaves a trailing slash. Other percent-escapes are
/// kept as they are. Paths without a leading `/` are returned unchanged.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let Some(rest) = path.strip_prefix('/') else {
        return Cow::Borrowed(path);
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if !segments
        .iter()
        .any(|segment| is_single_dot(segment) || is_double_dot(segment))
    {
        return Cow::Borrowed(path);
    }

    let last = segments.len() - 1;
    let mut output: Vec<&str> = Vec::with_capacity(segments.len());
    for (index, segment) in segments.into_iter().enumerate() {
        if is_double_dot(segment) {
            output.pop();
            if index == last {
                output.push("");
            }
        } else if is_single_dot(segment) {
            if index == last {
                output.push("");
            }
        } else {
            output.push(segment);
        }
    }

    Cow::Owned(format!("/{}", output.join("/")))
}

/// `uri` with its path replaced by `path`, keeping the query. `None` if the result does
/// not parse back into a URI.
fn with_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// access_gate
///
/// Axum middleware wrapping the whole application router.
///
/// 1. The path is normalized first, so the exclusion check, the gate and the handlers all
///    see the same resolved path.
/// 2. Excluded paths go straight through; no session lookup happens for them.
/// 3. Otherwise the session provider resolves the `AuthContext` for the request.
/// 4. The gate decides. On `Allow` the context is stored in the request extensions so
///    handlers do not resolve it twice; redirects answer with 307 and a `Location`.
pub async fn access_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let uri = request.uri().clone();
    let path = normalize_path(uri.path());

    if let Cow::Owned(resolved) = &path {
        tracing::debug!(raw = uri.path(), path = %resolved, "normalized request path");
        if let Some(rewritten) = with_path(&uri, resolved) {
            *request.uri_mut() = rewritten;
        }
    }
    let path = path.as_ref();

    if !should_run_gate(path) {
        return next.run(request).await;
    }

    let auth = state.sessions.resolve(request.headers()).await;
    let (rule, decision) = state.gate.evaluate_traced(path, uri.query(), auth);

    tracing::debug!(path, rule, ?auth, ?decision, "access gate evaluated");

    match decision.into_redirect() {
        None => {
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        Some(redirect) => {
            tracing::info!(path, rule, "access gate redirected request");
            redirect
        }
    }
}
