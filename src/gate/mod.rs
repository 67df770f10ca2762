//! Request access-control gate.
//!
//! Combines a request path with the caller's `AuthContext` and yields a navigation
//! `Decision`. Pure and synchronous: no I/O, no shared state, same inputs give the same
//! output.

pub mod classifier;
pub mod rules;

use axum::response::{IntoResponse, Redirect, Response};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub use classifier::{Classification, RouteCategory, RouteTable, matches_prefix};
pub use rules::{DASHBOARD_PATH, GateInput, RULES, Rule, SIGN_IN_PATH, UNAUTHORIZED_PATH};

use crate::models::AuthContext;

/// Query parameter carrying the originally requested resource on the sign-in redirect.
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Bytes escaped in the callback value: everything except ASCII alphanumerics and
/// `- _ . ! ~ * ' ( )`, the same set a browser's `encodeURIComponent` leaves alone.
const CALLBACK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decision
///
/// The gate's only output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through unmodified.
    Allow,
    /// Send the caller elsewhere. `callback_url` is already percent-encoded.
    RedirectTo {
        path: &'static str,
        callback_url: Option<String>,
    },
}

impl Decision {
    pub fn redirect(path: &'static str) -> Self {
        Decision::RedirectTo {
            path,
            callback_url: None,
        }
    }

    /// Redirect to the sign-in page, remembering `path` and its query string.
    pub fn sign_in(path: &str, query: Option<&str>) -> Self {
        Decision::RedirectTo {
            path: SIGN_IN_PATH,
            callback_url: Some(encode_callback(path, query)),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Redirect target including the callback parameter, `None` for `Allow`.
    pub fn location(&self) -> Option<String> {
        match self {
            Decision::Allow => None,
            Decision::RedirectTo {
                path,
                callback_url: None,
            } => Some((*path).to_string()),
            Decision::RedirectTo {
                path,
                callback_url: Some(callback),
            } => Some(format!("{path}?{CALLBACK_PARAM}={callback}")),
        }
    }

    /// The HTTP response for a redirect decision (307), `None` for `Allow`.
    pub fn into_redirect(self) -> Option<Response> {
        self.location()
            .map(|location| Redirect::temporary(&location).into_response())
    }
}

/// Percent-encodes `path` plus `?query` (only when the query is non-empty).
pub fn encode_callback(path: &str, query: Option<&str>) -> String {
    let target = match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    };
    utf8_percent_encode(&target, CALLBACK_ENCODE_SET).to_string()
}

/// AccessGate
///
/// The decision function bound to a route table. Cheap to copy; the application keeps one
/// in `AppState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessGate {
    table: RouteTable,
}

impl AccessGate {
    pub const fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn classify(&self, path: &str) -> Classification {
        self.table.classify(path)
    }

    pub fn evaluate(&self, path: &str, query: Option<&str>, auth: AuthContext) -> Decision {
        self.evaluate_traced(path, query, auth).1
    }

    /// Like `evaluate`, also naming the rule that produced the decision.
    pub fn evaluate_traced(
        &self,
        path: &str,
        query: Option<&str>,
        auth: AuthContext,
    ) -> (&'static str, Decision) {
        let input = GateInput {
            path,
            query,
            auth,
            class: self.classify(path),
        };

        RULES
            .iter()
            .find(|rule| (rule.applies)(&input.class))
            .map(|rule| (rule.name, (rule.outcome)(&input)))
            .unwrap_or(("default", Decision::Allow))
    }
}

/// Evaluates against the application's route table.
pub fn evaluate(path: &str, query: Option<&str>, auth: AuthContext) -> Decision {
    AccessGate::default().evaluate(path, query, auth)
}
