//! The gate's precedence, written down as data.
//!
//! `RULES` is walked in order and the first rule whose predicate holds produces the
//! decision. The final rule always applies, which makes evaluation total.

use super::{Decision, classifier::Classification};
use crate::models::AuthContext;

/// Where signed-in users are sent when they open an auth page.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Sign-in page for anonymous callers hitting a gated route.
pub const SIGN_IN_PATH: &str = "/auth/signin";
/// Shown to signed-in users lacking the flag a route requires.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Everything a rule may look at for one request.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub auth: AuthContext,
    pub class: Classification,
}

/// Rule
///
/// One `(predicate, outcome)` pair. `applies` sees only the path classification; `outcome`
/// runs once the rule has been selected.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&Classification) -> bool,
    pub outcome: fn(&GateInput<'_>) -> Decision,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

pub const RULES: [Rule; 4] = [
    // Checked before `public` even though every auth route is also public.
    Rule {
        name: "auth",
        applies: is_auth_route,
        outcome: auth_route,
    },
    Rule {
        name: "public",
        applies: is_public_route,
        outcome: allow,
    },
    Rule {
        name: "gated",
        applies: is_gated_route,
        outcome: gated_route,
    },
    // Unlisted paths are reachable without a session.
    Rule {
        name: "default",
        applies: always,
        outcome: allow,
    },
];

fn is_auth_route(class: &Classification) -> bool {
    class.auth
}

fn is_public_route(class: &Classification) -> bool {
    class.public
}

fn is_gated_route(class: &Classification) -> bool {
    class.is_gated()
}

fn always(_: &Classification) -> bool {
    true
}

fn allow(_: &GateInput<'_>) -> Decision {
    Decision::Allow
}

fn auth_route(input: &GateInput<'_>) -> Decision {
    if input.auth.is_logged_in {
        Decision::redirect(DASHBOARD_PATH)
    } else {
        Decision::Allow
    }
}

fn gated_route(input: &GateInput<'_>) -> Decision {
    if !input.auth.is_logged_in {
        return Decision::sign_in(input.path, input.query);
    }

    if input.class.parent_only && !may_access_parent_only(&input.auth) {
        return Decision::redirect(UNAUTHORIZED_PATH);
    }

    if input.class.admin && !may_access_admin(&input.auth) {
        return Decision::redirect(UNAUTHORIZED_PATH);
    }

    Decision::Allow
}

pub fn may_access_parent_only(auth: &AuthContext) -> bool {
    auth.is_parent
}

/// Admin routes have no role of their own yet and reuse the parent flag.
pub fn may_access_admin(auth: &AuthContext) -> bool {
    auth.is_parent
}
