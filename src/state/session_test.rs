use std::sync::Arc;

use serde_json::{Value, json};

use super::*;
use crate::error::ApiError;
use crate::nav::{LOGIN_PATH, Navigator, RouteTracker, SIGNUP_PATH};
use crate::net::transport::Method;
use crate::net::transport::test_helpers::StubTransport;
use crate::net::{PendingRequest, REFRESH_PATH};
use crate::services::auth::{LOGIN_PATH as LOGIN_ENDPOINT, LOGOUT_PATH, REGISTER_PATH};
use crate::services::users::PROFILE_PATH;
use crate::store::{CredentialStore, Credentials, MemoryStore};

// =========================================================================
// Harness
// =========================================================================

struct Harness {
    session: SessionContext,
    transport: Arc<StubTransport>,
    store: Arc<MemoryStore>,
    nav: Arc<RouteTracker>,
}

fn pair() -> Credentials {
    Credentials::new("access-1", "refresh-1")
}

fn cached() -> CachedUser {
    CachedUser { id: "u1".into(), name: "Ada (cached)".into(), email: "ada@example.com".into(), avatar: None }
}

fn profile_body() -> Value {
    json!({
        "id": "u1",
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "avatar": "https://cdn.example.com/ada.png",
        "bio": "Analyst",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-06-01T00:00:00Z"
    })
}

fn login_body() -> Value {
    json!({
        "success": true,
        "data": {
            "user": { "sub": "u1", "email": "ada@example.com", "name": "Ada", "role": "USER", "status": "ACTIVE" },
            "accessToken": "access-login",
            "refreshToken": "refresh-login",
            "expiresIn": 900
        }
    })
}

fn harness(store: MemoryStore, path: &str) -> Harness {
    let transport = Arc::new(StubTransport::new());
    let store = Arc::new(store);
    let nav = Arc::new(RouteTracker::new(path));
    let client = ApiClient::new(transport.clone(), store.clone(), nav.clone());
    Harness { session: SessionContext::new(client), transport, store, nav }
}

fn signed_in(path: &str) -> Harness {
    harness(MemoryStore::with_session(&pair(), Some(&cached())), path)
}

// =========================================================================
// Hydration and startup
// =========================================================================

#[test]
fn new_hydrates_from_cached_user() {
    let h = signed_in("/");
    assert_eq!(h.session.user(), Some(cached()));
    assert!(!h.session.is_loading());
}

#[test]
fn new_without_session_is_anonymous() {
    let h = harness(MemoryStore::new(), "/");
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
    assert!(!h.session.snapshot().is_authenticated());
}

#[tokio::test]
async fn verify_without_token_makes_no_request() {
    let h = harness(MemoryStore::new(), "/");
    assert_eq!(h.session.verify().await, None);
    assert!(h.transport.sent().is_empty());
    assert!(!h.session.is_loading());
}

#[tokio::test]
async fn verify_replaces_cached_user_with_profile() {
    let h = signed_in("/");
    h.transport.reply(Method::Get, PROFILE_PATH, 200, profile_body());

    let user = h.session.verify().await.unwrap();

    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(user.avatar.as_deref(), Some("https://cdn.example.com/ada.png"));
    assert_eq!(h.store.cached_user().unwrap(), Some(user.clone()));
    assert_eq!(h.session.user(), Some(user));
    assert!(!h.session.is_loading());
}

#[tokio::test]
async fn verify_twice_is_idempotent() {
    let h = signed_in("/");
    h.transport.reply(Method::Get, PROFILE_PATH, 200, profile_body());

    let first = h.session.verify().await;
    let second = h.session.verify().await;

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(h.transport.count(Method::Get, PROFILE_PATH), 2);
    assert_eq!(h.transport.count(Method::Post, REFRESH_PATH), 0);
}

#[tokio::test]
async fn verify_failure_drops_cached_user_but_keeps_tokens() {
    let h = signed_in("/");
    h.transport.reply(Method::Get, PROFILE_PATH, 503, json!({ "message": "maintenance" }));

    assert_eq!(h.session.verify().await, None);
    assert_eq!(h.session.user(), None);
    assert_eq!(h.store.cached_user().unwrap(), None);
    assert_eq!(h.store.credentials().unwrap(), Some(pair()));
    assert_eq!(h.nav.redirect_count(), 0);
}

#[tokio::test]
async fn verify_refreshes_expired_token() {
    let h = signed_in("/");
    h.transport
        .reply(Method::Get, PROFILE_PATH, 401, json!({}))
        .reply(Method::Get, PROFILE_PATH, 200, profile_body());
    h.transport.reply(
        Method::Post,
        REFRESH_PATH,
        200,
        json!({ "success": true, "data": { "accessToken": "access-2", "refreshToken": "refresh-2" } }),
    );

    assert!(h.session.verify().await.is_some());
    assert_eq!(h.store.credentials().unwrap(), Some(Credentials::new("access-2", "refresh-2")));
}

#[tokio::test]
async fn verify_with_failed_refresh_signs_out() {
    let h = signed_in("/notes");
    h.transport.reply(Method::Get, PROFILE_PATH, 401, json!({}));
    h.transport.reply(Method::Post, REFRESH_PATH, 401, json!({ "success": false }));

    assert_eq!(h.session.verify().await, None);
    assert!(h.store.is_empty());
    assert_eq!(h.nav.redirect_count(), 1);
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
}

// =========================================================================
// Login
// =========================================================================

#[tokio::test]
async fn login_persists_all_keys_together() {
    let h = harness(MemoryStore::new(), LOGIN_PATH);
    h.transport.reply(Method::Post, LOGIN_ENDPOINT, 200, login_body());

    let user = h.session.login("ada@example.com", "hunter22").await.unwrap();

    assert_eq!(user, CachedUser { id: "u1".into(), name: "Ada".into(), email: "ada@example.com".into(), avatar: None });
    assert_eq!(h.store.credentials().unwrap(), Some(Credentials::new("access-login", "refresh-login")));
    assert_eq!(h.store.cached_user().unwrap(), Some(user.clone()));
    assert_eq!(h.session.snapshot(), SessionSnapshot { user: Some(user), loading: false });

    let sent = &h.transport.sent()[0];
    assert_eq!(sent.body, Some(json!({ "email": "ada@example.com", "password": "hunter22" })));
}

#[tokio::test]
async fn login_rejection_leaves_state_untouched() {
    let h = harness(MemoryStore::new(), LOGIN_PATH);
    h.transport.reply(Method::Post, LOGIN_ENDPOINT, 401, json!({ "success": false, "message": "Invalid email or password" }));

    let err = h.session.login("ada@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.message(), "Invalid email or password");
    assert!(h.store.is_empty());
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
    assert_eq!(h.transport.count(Method::Post, REFRESH_PATH), 0);
    assert_eq!(h.nav.redirect_count(), 0);
}

#[tokio::test]
async fn login_without_data_fails() {
    let h = harness(MemoryStore::new(), LOGIN_PATH);
    h.transport.reply(Method::Post, LOGIN_ENDPOINT, 200, json!({ "success": true }));

    let err = h.session.login("ada@example.com", "hunter22").await.unwrap_err();

    assert_eq!(err.message(), "Login failed");
    assert!(h.store.is_empty());
    assert!(!h.session.is_loading());
}

#[tokio::test]
async fn login_with_blank_token_persists_nothing() {
    let h = harness(MemoryStore::new(), LOGIN_PATH);
    let mut body = login_body();
    body["data"]["refreshToken"] = json!("");
    h.transport.reply(Method::Post, LOGIN_ENDPOINT, 200, body);

    let err = h.session.login("ada@example.com", "hunter22").await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert!(h.store.is_empty());
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
}

#[tokio::test]
async fn login_publishes_to_subscribers() {
    let h = harness(MemoryStore::new(), LOGIN_PATH);
    h.transport.reply(Method::Post, LOGIN_ENDPOINT, 200, login_body());
    let mut rx = h.session.subscribe();

    h.session.login("ada@example.com", "hunter22").await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_authenticated());
}

// =========================================================================
// Signup
// =========================================================================

#[tokio::test]
async fn signup_returns_user_id_without_session() {
    let h = harness(MemoryStore::new(), SIGNUP_PATH);
    h.transport.reply(Method::Post, REGISTER_PATH, 201, json!({ "success": true, "data": { "userId": "u-new" } }));

    let user_id = h.session.signup("Grace", "grace@example.com", "s3cret!").await.unwrap();

    assert_eq!(user_id, "u-new");
    assert!(h.store.is_empty());
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
    let sent = &h.transport.sent()[0];
    assert_eq!(sent.body.as_ref().unwrap()["role"], "USER");
}

#[tokio::test]
async fn signup_joins_validation_messages() {
    let h = harness(MemoryStore::new(), SIGNUP_PATH);
    h.transport.reply(
        Method::Post,
        REGISTER_PATH,
        400,
        json!({ "success": false, "message": ["email must be an email", "password is too weak"] }),
    );

    let err = h.session.signup("Grace", "not-an-email", "x").await.unwrap_err();

    assert_eq!(err.message(), "email must be an email, password is too weak");
    assert!(!h.session.is_loading());
}

// =========================================================================
// Logout
// =========================================================================

#[tokio::test]
async fn logout_clears_even_when_backend_unreachable() {
    let h = signed_in("/settings");
    h.transport.fail(Method::Post, LOGOUT_PATH, "connection refused");

    h.session.logout().await;

    assert!(h.store.is_empty());
    assert_eq!(h.session.user(), None);
}

#[tokio::test]
async fn logout_sends_bearer_and_clears() {
    let h = signed_in("/settings");
    h.transport.reply(Method::Post, LOGOUT_PATH, 200, json!({ "success": true }));

    h.session.logout().await;

    assert_eq!(h.transport.sent()[0].bearer(), Some("access-1"));
    assert!(h.store.is_empty());
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
}

// =========================================================================
// Expiry observed through the context
// =========================================================================

#[tokio::test]
async fn failed_refresh_in_any_call_signs_session_out() {
    let h = signed_in("/notes");
    h.transport.reply(Method::Get, "/notes", 401, json!({}));
    h.transport.fail(Method::Post, REFRESH_PATH, "timeout");
    let mut rx = h.session.subscribe();

    let err = h.session.client().execute(PendingRequest::get("/notes")).await.unwrap_err();

    assert!(err.is_auth_failure());
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), SessionSnapshot::default());
    assert_eq!(h.nav.current_path(), LOGIN_PATH);
}

#[tokio::test]
async fn logout_during_refresh_leaves_store_empty() {
    let h = signed_in("/notes");
    h.transport
        .reply(Method::Get, "/notes", 401, json!({}))
        .reply(Method::Get, "/notes", 200, json!([]));
    h.transport
        .reply(
            Method::Post,
            REFRESH_PATH,
            200,
            json!({ "success": true, "data": { "accessToken": "access-2", "refreshToken": "refresh-2" } }),
        )
        .hold(Method::Post, REFRESH_PATH);
    h.transport.reply(Method::Post, LOGOUT_PATH, 200, json!({ "success": true }));

    let client = h.session.client().clone();
    let request = tokio::spawn(async move { client.execute(PendingRequest::get("/notes")).await });
    h.transport.wait_for(Method::Post, REFRESH_PATH, 1).await;

    let session = h.session.clone();
    let logout = tokio::spawn(async move { session.logout().await });
    h.transport.wait_for(Method::Post, LOGOUT_PATH, 1).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    assert!(!logout.is_finished());

    h.transport.release(Method::Post, REFRESH_PATH);
    request.await.unwrap().unwrap();
    logout.await.unwrap();

    assert!(h.store.is_empty());
    assert_eq!(h.store.credentials().unwrap(), None);
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
    assert_eq!(h.transport.count(Method::Post, REFRESH_PATH), 1);
}

#[tokio::test]
async fn store_emptied_elsewhere_signs_session_out() {
    let h = signed_in("/notes");
    h.transport.reply(Method::Get, "/notes", 401, json!({})).hold(Method::Get, "/notes");

    let client = h.session.client().clone();
    let request = tokio::spawn(async move { client.execute(PendingRequest::get("/notes")).await });
    h.transport.wait_for(Method::Get, "/notes", 1).await;

    // Another process sharing the store signs out while the request is in flight.
    h.store.clear().unwrap();
    h.transport.release(Method::Get, "/notes");

    let err = request.await.unwrap().unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(h.session.user(), None);
    assert_eq!(h.nav.redirect_count(), 1);
    assert_eq!(h.nav.current_path(), LOGIN_PATH);
    assert_eq!(h.transport.count(Method::Post, REFRESH_PATH), 0);
}

#[tokio::test]
async fn expired_session_is_not_redirected_twice() {
    let h = signed_in("/notes");
    h.transport.reply(Method::Get, "/notes", 401, json!({}));
    h.transport.reply(Method::Get, "/tasks", 401, json!({})).hold(Method::Get, "/tasks");
    h.transport.reply(Method::Post, REFRESH_PATH, 401, json!({ "success": false }));

    let client = h.session.client().clone();
    let slow = tokio::spawn(async move { client.execute(PendingRequest::get("/tasks")).await });
    h.transport.wait_for(Method::Get, "/tasks", 1).await;

    let first = h.session.client().execute(PendingRequest::get("/notes")).await.unwrap_err();
    h.transport.release(Method::Get, "/tasks");
    let second = slow.await.unwrap().unwrap_err();

    assert!(matches!(first, ApiError::RefreshFailed(_)));
    assert!(matches!(second, ApiError::SessionExpired));
    assert_eq!(h.nav.redirect_count(), 1);
    assert_eq!(h.session.snapshot(), SessionSnapshot::default());
}
