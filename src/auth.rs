use std::{convert::Infallible, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::AuthContext,
};

/// Header used by the local development bypass to pick the signed-in user.
pub const BYPASS_USER_HEADER: &str = "x-user-id";
/// Header used by the local development bypass to set the parent flag.
pub const BYPASS_PARENT_HEADER: &str = "x-user-parent";

/// Claims
///
/// Payload of the session JWT issued by the sign-in flow. The gate only cares about the
/// subject being present and the `isParent` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID.
    pub sub: Uuid,
    /// The elevated flag, written by the sign-in flow from the user's profile.
    #[serde(rename = "isParent", default)]
    pub is_parent: bool,
    /// Expiration Time (exp). Always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Reasons a request could not be tied to a session. Never surfaced to the caller: every
/// variant resolves to an anonymous `AuthContext`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no session token on the request")]
    MissingToken,
    #[error("session token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("malformed x-user-id header")]
    InvalidBypassHeader,
}

/// SessionProvider
///
/// Resolves the `AuthContext` for a request from its headers. The gate never performs its
/// own credential lookup; it receives whatever the provider produced.
///
/// Implementations must be total: failures map to `AuthContext::anonymous()`.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> AuthContext;
}

/// Shared handle to the session provider, constructed once in `main` and carried in `AppState`.
pub type SessionState = Arc<dyn SessionProvider>;

/// JwtSessionProvider
///
/// Verifies HS256 session JWTs taken from the `Authorization: Bearer` header or, failing
/// that, from the session cookie set by the sign-in flow.
///
/// In `Env::Local` a development bypass is honoured first: a UUID in `x-user-id` logs the
/// caller in and `x-user-parent: true` sets the parent flag.
pub struct JwtSessionProvider {
    env: Env,
    decoding_key: DecodingKey,
    validation: Validation,
    session_cookie: String,
}

impl JwtSessionProvider {
    pub fn new(config: &AppConfig) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            env: config.env.clone(),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            session_cookie: config.session_cookie.clone(),
        }
    }

    /// Development bypass. `Ok(None)` when no bypass header is present.
    fn bypass(&self, headers: &HeaderMap) -> Result<Option<AuthContext>, SessionError> {
        let Some(value) = headers.get(BYPASS_USER_HEADER) else {
            return Ok(None);
        };

        value
            .to_str()
            .ok()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or(SessionError::InvalidBypassHeader)?;

        let is_parent = headers
            .get(BYPASS_PARENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        Ok(Some(AuthContext {
            is_logged_in: true,
            is_parent,
        }))
    }

    /// Bearer token first, then the session cookie.
    fn token<'a>(&self, headers: &'a HeaderMap, jar: &'a CookieJar) -> Option<&'a str> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        bearer.or_else(|| jar.get(&self.session_cookie).map(|cookie| cookie.value()))
    }

    fn verify(&self, headers: &HeaderMap) -> Result<AuthContext, SessionError> {
        let jar = CookieJar::from_headers(headers);
        let token = self.token(headers, &jar).ok_or(SessionError::MissingToken)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        Ok(AuthContext {
            is_logged_in: true,
            is_parent: data.claims.is_parent,
        })
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn resolve(&self, headers: &HeaderMap) -> AuthContext {
        if self.env == Env::Local {
            match self.bypass(headers) {
                Ok(Some(ctx)) => return ctx,
                Ok(None) => {}
                // A bad bypass header falls through to regular token validation.
                Err(e) => tracing::debug!(error = %e, "ignoring session bypass"),
            }
        }

        match self.verify(headers) {
            Ok(ctx) => ctx,
            Err(SessionError::MissingToken) => AuthContext::anonymous(),
            Err(e) => {
                tracing::debug!(error = %e, "treating request as anonymous");
                AuthContext::anonymous()
            }
        }
    }
}

/// StaticSessionProvider
///
/// Resolves every request to the same context. Used for tests and local demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSessionProvider {
    context: AuthContext,
}

impl StaticSessionProvider {
    pub fn new(context: AuthContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn resolve(&self, _headers: &HeaderMap) -> AuthContext {
        self.context
    }
}

/// AuthContext Extractor Implementation
///
/// Lets handlers take `AuthContext` as an argument. If the access gate already resolved the
/// context for this request it is reused from the request extensions; otherwise (API routes
/// bypass the gate) the session provider is asked directly.
///
/// Never rejects: an unresolvable session is an anonymous caller.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(*ctx);
        }

        let sessions = SessionState::from_ref(state);
        Ok(sessions.resolve(&parts.headers).await)
    }
}
