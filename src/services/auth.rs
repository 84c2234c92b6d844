//! Auth endpoints under `/v1/users/auth`.
//!
//! All bodies are enveloped. Login, register and logout are normally reached
//! through [`SessionContext`](crate::state::SessionContext), which keeps the
//! store and session snapshot in step; the rest are safe to call directly.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::types::{Envelope, LoginData, LoginRequest, RegisterData, RegisterRequest};
use crate::net::{ApiClient, PendingRequest};

pub const LOGIN_PATH: &str = "/v1/users/auth/login";
pub const REGISTER_PATH: &str = "/v1/users/auth/register";
pub const LOGOUT_PATH: &str = "/v1/users/auth/logout";
const VERIFY_EMAIL_PATH: &str = "/v1/users/auth/verify-email";
const FORGOT_PASSWORD_PATH: &str = "/v1/users/auth/forgot-password";
const RESET_PASSWORD_PATH: &str = "/v1/users/auth/reset-password";
const RESEND_OTP_PATH: &str = "/v1/users/auth/resend-otp";
const SESSIONS_PATH: &str = "/v1/users/auth/sessions";

/// Role assigned to self-registered accounts.
pub const DEFAULT_ROLE: &str = "USER";

/// A server-side login session (one per refresh token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub id: String,
    pub created_at: String,
    pub last_active_at: String,
}

#[derive(Deserialize)]
struct SessionsData {
    sessions: Vec<AuthSession>,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct OtpBody<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct ResetBody<'a> {
    email: &'a str,
    otp: &'a str,
    password: &'a str,
}

/// `POST /v1/users/auth/login`.
///
/// # Errors
///
/// Bad credentials arrive as [`ApiError::Unauthorized`] (on the login page) or
/// [`ApiError::Rejected`]; an envelope without data is `Rejected("Login failed")`.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<LoginData, ApiError> {
    let request = PendingRequest::post(LOGIN_PATH).json(&LoginRequest { email, password })?;
    client
        .execute(request)
        .await?
        .json::<Envelope<LoginData>>()?
        .into_result()?
        .ok_or_else(|| ApiError::Rejected { message: "Login failed".into() })
}

/// `POST /v1/users/auth/register`; returns the new user id.
///
/// # Errors
///
/// Validation failures carry the backend's messages joined with `", "`.
pub async fn register(client: &ApiClient, name: &str, email: &str, password: &str) -> Result<String, ApiError> {
    let body = RegisterRequest { name, email, password, role: DEFAULT_ROLE };
    let data: RegisterData = client.fetch_data(PendingRequest::post(REGISTER_PATH).json(&body)?).await?;
    Ok(data.user_id)
}

/// `POST /v1/users/auth/logout`.
///
/// # Errors
///
/// Any pipeline error; callers treat this call as best-effort.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    client.acknowledge(PendingRequest::post(LOGOUT_PATH)).await
}

/// # Errors
///
/// Any pipeline error, or [`ApiError::Rejected`] for a wrong or expired code.
pub async fn verify_email(client: &ApiClient, email: &str, otp: &str) -> Result<(), ApiError> {
    client.acknowledge(PendingRequest::post(VERIFY_EMAIL_PATH).json(&OtpBody { email, otp })?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn forgot_password(client: &ApiClient, email: &str) -> Result<(), ApiError> {
    client.acknowledge(PendingRequest::post(FORGOT_PASSWORD_PATH).json(&EmailBody { email })?).await
}

/// # Errors
///
/// Any pipeline error, or [`ApiError::Rejected`] for a wrong or expired code.
pub async fn reset_password(client: &ApiClient, email: &str, otp: &str, password: &str) -> Result<(), ApiError> {
    let body = ResetBody { email, otp, password };
    client.acknowledge(PendingRequest::post(RESET_PASSWORD_PATH).json(&body)?).await
}

/// Re-send the verification code; returns the user id it was sent for.
///
/// # Errors
///
/// Any pipeline error.
pub async fn resend_otp(client: &ApiClient, email: &str) -> Result<String, ApiError> {
    let data: RegisterData = client.fetch_data(PendingRequest::post(RESEND_OTP_PATH).json(&EmailBody { email })?).await?;
    Ok(data.user_id)
}

/// # Errors
///
/// Any pipeline error.
pub async fn sessions(client: &ApiClient) -> Result<Vec<AuthSession>, ApiError> {
    let data: SessionsData = client.fetch_data(PendingRequest::get(SESSIONS_PATH)).await?;
    Ok(data.sessions)
}

/// # Errors
///
/// Any pipeline error.
pub async fn revoke_session(client: &ApiClient, session_id: &str) -> Result<(), ApiError> {
    client.acknowledge(PendingRequest::delete(format!("{SESSIONS_PATH}/{session_id}"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn revoke_all_sessions(client: &ApiClient) -> Result<(), ApiError> {
    client.acknowledge(PendingRequest::delete(SESSIONS_PATH)).await
}
