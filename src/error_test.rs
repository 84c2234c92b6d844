use super::*;

#[test]
fn unauthorized_uses_envelope_message() {
    let err = ApiError::unauthorized(r#"{"success":false,"message":"Invalid credentials"}"#);
    assert_eq!(err.message(), "Invalid credentials");
    assert!(err.is_auth_failure());
}

#[test]
fn unauthorized_without_body_has_default_message() {
    assert_eq!(ApiError::unauthorized("").message(), "Unauthorized");
}

#[test]
fn status_joins_message_list() {
    let err = ApiError::status(400, r#"{"success":false,"message":["email must be an email","password too short"]}"#);
    assert_eq!(err.message(), "email must be an email, password too short");
    assert!(matches!(err, ApiError::Status { status: 400, .. }));
}

#[test]
fn status_falls_back_to_code() {
    assert_eq!(ApiError::status(502, "<html>bad gateway</html>").message(), "HTTP 502");
}

#[test]
fn refresh_failure_message_is_user_facing() {
    let err = ApiError::RefreshFailed("status 401".into());
    assert!(err.message().contains("log in again"));
    assert_eq!(err.error_code(), "E_REFRESH_FAILED");
}

#[test]
fn transport_is_not_auth_failure() {
    let err = ApiError::Transport("connection reset".into());
    assert!(!err.is_auth_failure());
    assert_eq!(err.message(), "transport error: connection reset");
}
