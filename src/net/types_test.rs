use super::*;

// =============================================================================
// Envelope
// =============================================================================

#[test]
fn envelope_success_yields_data() {
    let env: Envelope<RegisterData> =
        serde_json::from_str(r#"{"success":true,"data":{"userId":"u-9"}}"#).unwrap();
    assert_eq!(env.into_data().unwrap().user_id, "u-9");
}

#[test]
fn envelope_failure_on_2xx_is_rejected() {
    let env: Envelope<Value> =
        serde_json::from_str(r#"{"success":false,"message":"Email already registered"}"#).unwrap();
    let err = env.into_result().unwrap_err();
    assert!(matches!(err, ApiError::Rejected { ref message } if message == "Email already registered"));
}

#[test]
fn envelope_failure_joins_message_list() {
    let env: Envelope<Value> =
        serde_json::from_str(r#"{"success":false,"message":["name is required","email is invalid"]}"#).unwrap();
    assert_eq!(env.into_result().unwrap_err().message(), "name is required, email is invalid");
}

#[test]
fn envelope_without_data_is_decode_error_when_required() {
    let env: Envelope<TokenPair> = serde_json::from_str(r#"{"success":true}"#).unwrap();
    assert!(matches!(env.into_data(), Err(ApiError::Decode(_))));
}

// =============================================================================
// message_from_body
// =============================================================================

#[test]
fn message_from_error_field() {
    assert_eq!(message_from_body(r#"{"error":"Not Found"}"#).as_deref(), Some("Not Found"));
}

#[test]
fn message_from_non_json_is_none() {
    assert_eq!(message_from_body("gateway timeout"), None);
}

#[test]
fn blank_message_is_none() {
    assert_eq!(message_from_body(r#"{"message":"  "}"#), None);
}

// =============================================================================
// Auth payloads
// =============================================================================

#[test]
fn login_data_maps_to_cached_user() {
    let data: LoginData = serde_json::from_value(serde_json::json!({
        "user": { "sub": "u-1", "email": "ada@example.com", "name": "Ada", "role": "USER", "status": "ACTIVE" },
        "accessToken": "a1",
        "refreshToken": "r1",
        "expiresIn": 900
    }))
    .unwrap();
    assert_eq!(data.credentials().unwrap(), Credentials::new("a1", "r1"));
    let user = CachedUser::from(data.user);
    assert_eq!(user.id, "u-1");
    assert_eq!(user.avatar, None);
}

#[test]
fn refresh_request_uses_camel_case() {
    let body = serde_json::to_value(RefreshRequest { refresh_token: "r1" }).unwrap();
    assert_eq!(body, serde_json::json!({ "refreshToken": "r1" }));
}

#[test]
fn token_pair_rejects_blank_token() {
    let pair = TokenPair { access_token: "a2".into(), refresh_token: String::new(), expires_in: None };
    assert!(matches!(pair.into_credentials(), Err(ApiError::Decode(_))));
}

#[test]
fn login_data_rejects_blank_token() {
    let data: LoginData = serde_json::from_value(serde_json::json!({
        "user": { "sub": "u-1", "email": "ada@example.com", "name": "Ada" },
        "accessToken": "  ",
        "refreshToken": "r1"
    }))
    .unwrap();
    let err = data.credentials().unwrap_err();
    assert!(matches!(err, ApiError::Decode(ref msg) if msg == "login returned an empty token"));
}
