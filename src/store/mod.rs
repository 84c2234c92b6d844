//! Credential store: durable home of the token pair and the cached user.
//!
//! DESIGN
//! ======
//! Three persisted keys (`accessToken`, `refreshToken`, `auth_user`) behind one
//! injectable trait. The token pair is a single value so a half-written pair
//! cannot be expressed; implementations only ever persist or drop it whole.
//!
//! The cached user is a denormalized snapshot for immediate rendering. It is
//! only kept while credentials exist and is reconciled against the verified
//! profile by the session context.

pub mod file;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use file::FileStore;
pub use memory::MemoryStore;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const AUTH_USER_KEY: &str = "auth_user";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by credential store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("credential store io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document is not valid JSON for the expected shape.
    #[error("credential store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A cached user was written while no credentials were stored.
    #[error("cannot cache a user without credentials")]
    MissingCredentials,

    /// A previous writer panicked while holding the store lock.
    #[error("credential store lock poisoned")]
    Poisoned,
}

// =============================================================================
// DATA
// =============================================================================

/// Access/refresh token pair issued by one login or refresh event.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Snapshot of the authenticated identity, persisted under `auth_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

// =============================================================================
// TRAIT
// =============================================================================

/// Durable key-value storage for the session's credentials.
///
/// Reads are expected to be cheap: the API client calls [`credentials`]
/// before every request instead of caching the token.
///
/// [`credentials`]: CredentialStore::credentials
pub trait CredentialStore: Send + Sync {
    /// Current token pair, or `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn credentials(&self) -> Result<Option<Credentials>, StoreError>;

    /// Replace both tokens in one write. The cached user is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_credentials(&self, credentials: &Credentials) -> Result<(), StoreError>;

    /// Replace both tokens and the cached user in one write.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_session(&self, credentials: &Credentials, user: &CachedUser) -> Result<(), StoreError>;

    /// Remove both tokens and the cached user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn cached_user(&self) -> Result<Option<CachedUser>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::MissingCredentials`] when signed out, or an
    /// error if the backing storage cannot be written.
    fn set_cached_user(&self, user: &CachedUser) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear_cached_user(&self) -> Result<(), StoreError>;
}

/// The three persisted keys as one document.
///
/// Shared by both implementations so they agree on what "consistent" means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Persisted {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(rename = "auth_user", default, skip_serializing_if = "Option::is_none")]
    pub auth_user: Option<CachedUser>,
}

impl Persisted {
    /// Token pair, or `None` unless both halves are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(Credentials::new(access.clone(), refresh.clone())),
            _ => None,
        }
    }

    /// Cached user, hidden when the token pair is incomplete.
    pub fn cached_user(&self) -> Option<CachedUser> {
        self.credentials().and(self.auth_user.clone())
    }

    pub fn set_credentials(&mut self, credentials: &Credentials) {
        self.access_token = Some(credentials.access_token.clone());
        self.refresh_token = Some(credentials.refresh_token.clone());
    }

    pub fn set_cached_user(&mut self, user: &CachedUser) -> Result<(), StoreError> {
        if self.credentials().is_none() {
            return Err(StoreError::MissingCredentials);
        }
        self.auth_user = Some(user.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
