use super::*;

fn pair() -> Credentials {
    Credentials::new("access-1", "refresh-1")
}

fn alice() -> CachedUser {
    CachedUser { id: "u1".into(), name: "Alice".into(), email: "alice@example.com".into(), avatar: None }
}

// =============================================================================
// Persisted
// =============================================================================

#[test]
fn persisted_half_pair_reads_as_signed_out() {
    let state = Persisted { access_token: Some("a".into()), ..Persisted::default() };
    assert!(state.credentials().is_none());
}

#[test]
fn persisted_hides_user_without_credentials() {
    let state = Persisted { auth_user: Some(alice()), ..Persisted::default() };
    assert!(state.cached_user().is_none());
}

#[test]
fn persisted_uses_browser_key_names() {
    let mut state = Persisted::default();
    state.set_credentials(&pair());
    state.set_cached_user(&alice()).unwrap();
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json[ACCESS_TOKEN_KEY], "access-1");
    assert_eq!(json[REFRESH_TOKEN_KEY], "refresh-1");
    assert_eq!(json[AUTH_USER_KEY]["email"], "alice@example.com");
}

#[test]
fn credentials_debug_redacts_tokens() {
    let rendered = format!("{:?}", pair());
    assert!(!rendered.contains("access-1"));
    assert!(!rendered.contains("refresh-1"));
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_starts_empty() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    assert!(store.credentials().unwrap().is_none());
    assert!(store.cached_user().unwrap().is_none());
}

#[test]
fn memory_store_set_session_writes_all_keys() {
    let store = MemoryStore::new();
    store.set_session(&pair(), &alice()).unwrap();
    assert_eq!(store.credentials().unwrap(), Some(pair()));
    assert_eq!(store.cached_user().unwrap(), Some(alice()));
}

#[test]
fn memory_store_refresh_keeps_cached_user() {
    let store = MemoryStore::with_session(&pair(), Some(&alice()));
    store.set_credentials(&Credentials::new("access-2", "refresh-2")).unwrap();
    assert_eq!(store.credentials().unwrap().unwrap().access_token, "access-2");
    assert_eq!(store.cached_user().unwrap(), Some(alice()));
}

#[test]
fn memory_store_clear_removes_everything() {
    let store = MemoryStore::with_session(&pair(), Some(&alice()));
    store.clear().unwrap();
    assert!(store.is_empty());
}

#[test]
fn memory_store_rejects_user_without_credentials() {
    let store = MemoryStore::new();
    assert!(matches!(store.set_cached_user(&alice()), Err(StoreError::MissingCredentials)));
    assert!(store.is_empty());
}

#[test]
fn memory_store_clear_cached_user_keeps_tokens() {
    let store = MemoryStore::with_session(&pair(), Some(&alice()));
    store.clear_cached_user().unwrap();
    assert!(store.cached_user().unwrap().is_none());
    assert_eq!(store.credentials().unwrap(), Some(pair()));
}
