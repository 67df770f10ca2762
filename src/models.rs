use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Session Schemas (Shared with the Frontend) ---

/// AuthContext
///
/// The per-request authentication facts the access gate consumes. It is produced by the
/// session provider before the gate runs and is never mutated afterwards.
///
/// Anything the provider cannot verify collapses to `AuthContext::anonymous()`, so the gate
/// only ever sees well-formed booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthContext {
    /// True once a valid session has been resolved for the request.
    pub is_logged_in: bool,
    /// The elevated flag. Grants access to parent-only routes and (for now) admin routes.
    pub is_parent: bool,
}

impl AuthContext {
    /// No session, or a session that failed verification.
    pub const fn anonymous() -> Self {
        Self {
            is_logged_in: false,
            is_parent: false,
        }
    }

    /// A signed-in user without the parent flag.
    pub const fn member() -> Self {
        Self {
            is_logged_in: true,
            is_parent: false,
        }
    }

    /// A signed-in user with the parent flag.
    pub const fn parent() -> Self {
        Self {
            is_logged_in: true,
            is_parent: true,
        }
    }
}
