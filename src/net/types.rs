//! Wire types shared by the pipeline and the auth endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::store::{CachedUser, Credentials};

// =============================================================================
// ENVELOPE
// =============================================================================

/// Backend message: a single string or a list of validation messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    One(String),
    Many(Vec<String>),
}

impl Message {
    /// Render as one line, joining lists with `", "`.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::One(text) => text.clone(),
            Self::Many(items) => items.join(", "),
        }
    }
}

/// `{success, message?, data?}` wrapper used by most backend endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: Option<Message>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Treat `success: false` as an error even on HTTP 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] carrying the backend message.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected {
                message: self.message.map_or_else(|| "Request failed".to_owned(), |m| m.joined()),
            })
        }
    }

    /// Like [`into_result`](Self::into_result) but `data` is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] on `success: false` and
    /// [`ApiError::Decode`] when `data` is missing.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.into_result()?.ok_or_else(|| ApiError::Decode("envelope has no data".into()))
    }
}

/// Pull a human-readable message out of an arbitrary error body.
///
/// Accepts enveloped bodies as well as bare `{message}` / `{error}` objects.
#[must_use]
pub fn message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let field = value.get("message").or_else(|| value.get("error"))?;
    let message = serde_json::from_value::<Message>(field.clone()).ok()?.joined();
    if message.trim().is_empty() { None } else { Some(message) }
}

// =============================================================================
// AUTH PAYLOADS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Identity claims returned by login. `sub` is the user id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<LoginUser> for CachedUser {
    fn from(user: LoginUser) -> Self {
        Self { id: user.sub, name: user.name, email: user.email, avatar: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: LoginUser,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl LoginData {
    /// Token pair to persist, rejecting blank tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if either token is empty.
    pub fn credentials(&self) -> Result<Credentials, ApiError> {
        non_blank_pair(&self.access_token, &self.refresh_token, "login")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenPair {
    /// Convert into stored credentials, rejecting blank tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if either token is empty.
    pub fn into_credentials(self) -> Result<Credentials, ApiError> {
        non_blank_pair(&self.access_token, &self.refresh_token, "refresh")
    }
}

fn non_blank_pair(access_token: &str, refresh_token: &str, source: &str) -> Result<Credentials, ApiError> {
    if access_token.trim().is_empty() || refresh_token.trim().is_empty() {
        return Err(ApiError::Decode(format!("{source} returned an empty token")));
    }
    Ok(Credentials::new(access_token, refresh_token))
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
