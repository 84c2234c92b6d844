//! Session context: reactive `{user, loading}` state over the credential store.
//!
//! DESIGN
//! ======
//! The snapshot lives in a `watch` channel owned by the [`ApiClient`], so the
//! pipeline can publish the terminal "signed out" transition itself when a
//! refresh fails. The context drives the other transitions: startup
//! verification, login, signup and logout.
//!
//! The persisted store is the source of truth; the snapshot only mirrors it.
//! Every transition writes the store first and publishes second.

use tokio::sync::watch;

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::services::{auth, users};
use crate::store::CachedUser;

/// What a UI needs to render the auth state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<CachedUser>,
    pub loading: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Clone)]
pub struct SessionContext {
    client: ApiClient,
}

impl SessionContext {
    /// Create the context and hydrate the snapshot from the cached user.
    ///
    /// The cached user may be stale; call [`verify`](Self::verify) to
    /// reconcile it with the server.
    pub fn new(client: ApiClient) -> Self {
        let user = match client.store().cached_user() {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "cached user unreadable");
                None
            }
        };
        client.session().send_replace(SessionSnapshot { user, loading: false });
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.client.session().borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<CachedUser> {
        self.client.session().borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.client.session().borrow().loading
    }

    /// Receiver that wakes on every snapshot change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.client.session().subscribe()
    }

    fn set_loading(&self, loading: bool) {
        self.client.session().send_modify(|s| s.loading = loading);
    }

    fn publish(&self, user: Option<CachedUser>) {
        self.client.session().send_replace(SessionSnapshot { user, loading: false });
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Startup check: confirm the stored session against `GET /users/profile`.
    ///
    /// Anonymous when no token is stored. On failure the user is dropped and
    /// the cached copy cleared; navigation after a failed refresh has already
    /// been signalled by the pipeline.
    pub async fn verify(&self) -> Option<CachedUser> {
        self.set_loading(true);

        let has_token = match self.client.store().credentials() {
            Ok(credentials) => credentials.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "credential store unreadable at startup");
                false
            }
        };
        if !has_token {
            self.publish(None);
            return None;
        }

        match users::profile(&self.client).await {
            Ok(profile) => {
                let user = CachedUser::from(profile);
                if let Err(e) = self.client.store().set_cached_user(&user) {
                    tracing::warn!(error = %e, "failed to cache verified user");
                }
                self.publish(Some(user.clone()));
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "session verification failed");
                if let Err(e) = self.client.store().clear_cached_user() {
                    tracing::warn!(error = %e, "failed to clear cached user");
                }
                self.publish(None);
                None
            }
        }
    }

    /// Sign in and persist the new session.
    ///
    /// # Errors
    ///
    /// Returns the backend's error with a displayable message; the current
    /// user is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<CachedUser, ApiError> {
        self.set_loading(true);
        let result = self.try_login(email, password).await;
        match &result {
            Ok(user) => self.publish(Some(user.clone())),
            Err(_) => self.set_loading(false),
        }
        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<CachedUser, ApiError> {
        let data = auth::login(&self.client, email, password).await?;
        let credentials = data.credentials()?;
        let user = CachedUser::from(data.user);
        self.client.store().set_session(&credentials, &user)?;
        tracing::info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Register an account. No session is established; the caller moves on
    /// to email verification. Returns the new user id.
    ///
    /// # Errors
    ///
    /// Returns the backend's validation messages joined into one string.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<String, ApiError> {
        self.set_loading(true);
        let result = auth::register(&self.client, name, email, password).await;
        self.set_loading(false);
        result
    }

    /// Best-effort server logout followed by unconditional local cleanup.
    pub async fn logout(&self) {
        if let Err(e) = auth::logout(&self.client).await {
            tracing::warn!(error = %e, "server logout failed; clearing local session anyway");
        }
        self.client.end_session().await;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
