use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, Method, Request, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use lending_gate::{
    AppState, AuthContext,
    auth::{
        BYPASS_PARENT_HEADER, BYPASS_USER_HEADER, Claims, JwtSessionProvider, SessionProvider,
        StaticSessionProvider,
    },
    config::{AppConfig, Env},
};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn create_token(is_parent: bool, exp: u64, secret: &str) -> String {
    let claims = Claims {
        sub: TEST_USER_ID,
        is_parent,
        iat: now() as usize,
        exp: exp as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn valid_token(is_parent: bool) -> String {
    create_token(is_parent, now() + 3600, TEST_JWT_SECRET)
}

fn create_provider(env: Env) -> JwtSessionProvider {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    JwtSessionProvider::new(&config)
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

fn get_request_parts(uri: Uri) -> Parts {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- JWT Session Provider ---

#[tokio::test]
async fn test_valid_bearer_token_logs_member_in() {
    let provider = create_provider(Env::Production);
    let auth = provider.resolve(&bearer(&valid_token(false))).await;
    assert_eq!(auth, AuthContext::member());
}

#[tokio::test]
async fn test_parent_claim_sets_parent_flag() {
    let provider = create_provider(Env::Production);
    let auth = provider.resolve(&bearer(&valid_token(true))).await;
    assert_eq!(auth, AuthContext::parent());
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let provider = create_provider(Env::Production);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("theme=dark; session-token={}", valid_token(true))).unwrap(),
    );

    assert_eq!(provider.resolve(&headers).await, AuthContext::parent());
}

#[tokio::test]
async fn test_missing_token_is_anonymous() {
    let provider = create_provider(Env::Production);
    assert_eq!(provider.resolve(&HeaderMap::new()).await, AuthContext::anonymous());
}

#[tokio::test]
async fn test_expired_token_is_anonymous() {
    let provider = create_provider(Env::Production);
    // Well past the default validation leeway.
    let token = create_token(true, now() - 3600, TEST_JWT_SECRET);
    assert_eq!(provider.resolve(&bearer(&token)).await, AuthContext::anonymous());
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_anonymous() {
    let provider = create_provider(Env::Production);
    let token = create_token(true, now() + 3600, "some-other-secret");
    assert_eq!(provider.resolve(&bearer(&token)).await, AuthContext::anonymous());
}

#[tokio::test]
async fn test_garbage_token_is_anonymous() {
    let provider = create_provider(Env::Production);
    assert_eq!(provider.resolve(&bearer("not-a-jwt")).await, AuthContext::anonymous());
}

// --- Local Development Bypass ---

#[tokio::test]
async fn test_local_bypass_success() {
    let provider = create_provider(Env::Local);
    let mut headers = HeaderMap::new();
    headers.insert(
        BYPASS_USER_HEADER,
        HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
    );
    assert_eq!(provider.resolve(&headers).await, AuthContext::member());

    headers.insert(BYPASS_PARENT_HEADER, HeaderValue::from_static("true"));
    assert_eq!(provider.resolve(&headers).await, AuthContext::parent());
}

#[tokio::test]
async fn test_local_bypass_with_bad_id_falls_back_to_token() {
    let provider = create_provider(Env::Local);
    let mut headers = bearer(&valid_token(true));
    headers.insert(BYPASS_USER_HEADER, HeaderValue::from_static("not-a-uuid"));

    assert_eq!(provider.resolve(&headers).await, AuthContext::parent());
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let provider = create_provider(Env::Production);
    let mut headers = HeaderMap::new();
    headers.insert(
        BYPASS_USER_HEADER,
        HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
    );
    headers.insert(BYPASS_PARENT_HEADER, HeaderValue::from_static("true"));

    assert_eq!(provider.resolve(&headers).await, AuthContext::anonymous());
}

// --- AuthContext Extractor ---

#[tokio::test]
async fn test_extractor_resolves_through_session_provider() {
    let state = AppState::new(
        Arc::new(StaticSessionProvider::new(AuthContext::parent())),
        AppConfig::default(),
    );
    let mut parts = get_request_parts("/api/session".parse().unwrap());

    let auth = AuthContext::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth, AuthContext::parent());
}

#[tokio::test]
async fn test_extractor_prefers_context_already_resolved_by_gate() {
    let state = AppState::new(
        Arc::new(StaticSessionProvider::new(AuthContext::parent())),
        AppConfig::default(),
    );
    let mut parts = get_request_parts("/dashboard".parse().unwrap());
    parts.extensions.insert(AuthContext::member());

    let auth = AuthContext::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth, AuthContext::member());
}
