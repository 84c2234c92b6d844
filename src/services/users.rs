//! Profile endpoints. Plain JSON bodies, no envelope.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::{ApiClient, PendingRequest};
use crate::store::CachedUser;

pub const PROFILE_PATH: &str = "/users/profile";
const USERS_PATH: &str = "/users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<UserProfile> for CachedUser {
    fn from(profile: UserProfile) -> Self {
        Self { id: profile.id, name: profile.name, email: profile.email, avatar: profile.avatar }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// `GET /users/profile`: the server-verified identity.
///
/// # Errors
///
/// Any pipeline error.
pub async fn profile(client: &ApiClient) -> Result<UserProfile, ApiError> {
    client.fetch(PendingRequest::get(PROFILE_PATH)).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn update_profile(client: &ApiClient, changes: &UpdateProfile) -> Result<UserProfile, ApiError> {
    client.fetch(PendingRequest::put(PROFILE_PATH).json(changes)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn delete_account(client: &ApiClient) -> Result<(), ApiError> {
    client.discard(PendingRequest::delete(PROFILE_PATH)).await
}

/// Admin-only listing of every account.
///
/// # Errors
///
/// Any pipeline error; non-admins get [`ApiError::Status`] 403.
pub async fn list_users(client: &ApiClient) -> Result<Vec<UserProfile>, ApiError> {
    client.fetch(PendingRequest::get(USERS_PATH)).await
}
