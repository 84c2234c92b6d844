//! Authenticated API client with transparent token refresh.
//!
//! PIPELINE
//! ========
//! Every call runs two explicit stages around the transport:
//!
//! 1. `authorize`: read the store at send time and attach
//!    `Authorization: Bearer <access>`; no token means an anonymous call.
//! 2. `recover`: entered only on HTTP 401. Skipped on auth pages. Otherwise
//!    one refresh through the bare transport, then one replay of the retained
//!    request. The replay's outcome is final.
//!
//! CONCURRENCY
//! ===========
//! Refreshes are single-flight. `recover` runs under an async gate; a handler
//! that finds the stored access token differs from the one it sent knows a
//! concurrent handler already rotated the pair and replays without refreshing.
//! A handler that finds the store empty knows the session was torn down, by a
//! concurrent handler, a logout or another process sharing the store. It fails
//! with [`ApiError::SessionExpired`], publishes the signed-out snapshot, and
//! redirects only if that snapshot still showed a user.
//!
//! Logout clears the store under the same gate, so a refresh that was already
//! in flight finishes before the clear instead of resurrecting the pair.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, watch};

use super::transport::{HttpTransport, PendingRequest, RawResponse, Transport};
use super::types::{Envelope, RefreshRequest, TokenPair};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::nav::{Navigator, is_auth_page};
use crate::state::SessionSnapshot;
use crate::store::{CredentialStore, Credentials};

pub const REFRESH_PATH: &str = "/v1/users/auth/refresh";

/// Cheap-to-clone handle shared by the session context and every service.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    session: watch::Sender<SessionSnapshot>,
    refresh_gate: Mutex<()>,
}

/// How a 401 handler should proceed once it holds the refresh gate.
enum Recovery {
    /// Store is empty: nothing to refresh with.
    NoCredentials,
    /// Another handler already rotated the pair; replay with this token.
    Rotated(String),
    /// This handler must refresh.
    Refresh(String),
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (session, _) = watch::channel(SessionSnapshot::default());
        Self { inner: Arc::new(Inner { transport, store, navigator, session, refresh_gate: Mutex::new(()) }) }
    }

    /// Client talking HTTP to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?), store, navigator))
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.inner.store.as_ref()
    }

    pub(crate) fn session(&self) -> &watch::Sender<SessionSnapshot> {
        &self.inner.session
    }

    // =========================================================================
    // ENTRY POINTS
    // =========================================================================

    /// Run a request through the pipeline.
    ///
    /// Resolves with any 2xx response; every other outcome is an error.
    ///
    /// # Errors
    ///
    /// Transport failures and non-401 statuses pass through unchanged. A 401
    /// yields [`ApiError::Unauthorized`], [`ApiError::RefreshFailed`] or
    /// [`ApiError::SessionExpired`] depending on how recovery went.
    pub async fn execute(&self, mut request: PendingRequest) -> Result<RawResponse, ApiError> {
        self.authorize(&mut request);
        let response = self.inner.transport.send(&request).await?;
        if response.status == 401 {
            return self.recover(request, &response).await;
        }
        check_status(response)
    }

    /// Run a request and decode a plain JSON body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); also [`ApiError::Decode`].
    pub async fn fetch<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, ApiError> {
        self.execute(request).await?.json()
    }

    /// Run a request and unwrap `data` from the `{success, message, data}` envelope.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); also [`ApiError::Rejected`] for
    /// `success: false` and [`ApiError::Decode`] for a missing `data`.
    pub async fn fetch_data<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, ApiError> {
        self.execute(request).await?.json::<Envelope<T>>()?.into_data()
    }

    /// Run an enveloped request whose `data` is irrelevant.
    ///
    /// # Errors
    ///
    /// See [`fetch_data`](Self::fetch_data).
    pub async fn acknowledge(&self, request: PendingRequest) -> Result<(), ApiError> {
        self.execute(request).await?.json::<Envelope<Value>>()?.into_result().map(drop)
    }

    /// Run a request and ignore whatever body comes back.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn discard(&self, request: PendingRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(drop)
    }

    // =========================================================================
    // STAGES
    // =========================================================================

    fn authorize(&self, request: &mut PendingRequest) {
        match self.inner.store.credentials() {
            Ok(Some(credentials)) => request.set_bearer(&credentials.access_token),
            Ok(None) => request.clear_bearer(),
            Err(e) => {
                tracing::warn!(error = %e, "credential store unreadable; sending anonymously");
                request.clear_bearer();
            }
        }
    }

    async fn recover(&self, mut request: PendingRequest, response: &RawResponse) -> Result<RawResponse, ApiError> {
        let original = ApiError::unauthorized(&response.text());
        let path = self.inner.navigator.current_path();
        if is_auth_page(&path) {
            tracing::debug!(%path, "401 on auth page; not refreshing");
            return Err(original);
        }

        let sent = request.bearer().map(str::to_owned);
        let gate = self.inner.refresh_gate.lock().await;

        let recovery = match self.inner.store.credentials() {
            Ok(Some(stored)) if sent.as_deref() != Some(stored.access_token.as_str()) => {
                Recovery::Rotated(stored.access_token)
            }
            Ok(Some(stored)) => Recovery::Refresh(stored.refresh_token),
            Ok(None) => Recovery::NoCredentials,
            Err(e) => {
                tracing::warn!(error = %e, "credential store unreadable during recovery");
                Recovery::NoCredentials
            }
        };

        let access_token = match recovery {
            Recovery::NoCredentials if sent.is_some() => {
                tracing::debug!("session cleared while the request was in flight");
                let previous = self.inner.session.send_replace(SessionSnapshot::default());
                if previous.user.is_some() {
                    self.inner.navigator.redirect_to_login();
                }
                return Err(ApiError::SessionExpired);
            }
            Recovery::NoCredentials => {
                self.expire_session();
                return Err(original);
            }
            Recovery::Rotated(access_token) => access_token,
            Recovery::Refresh(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(credentials) => credentials.access_token,
                Err(e) => {
                    tracing::warn!(error = %e, path = %request.path, "token refresh failed; ending session");
                    self.expire_session();
                    return Err(e);
                }
            },
        };
        drop(gate);

        request.set_bearer(&access_token);
        self.replay(&request).await
    }

    /// Exactly one refresh call, straight through the transport.
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, ApiError> {
        tracing::info!("access token rejected; refreshing");
        let request = PendingRequest::post(REFRESH_PATH).json(&RefreshRequest { refresh_token })?;

        let response = self
            .inner
            .transport
            .send(&request)
            .await
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;
        if !response.is_success() {
            return Err(ApiError::RefreshFailed(ApiError::status(response.status, &response.text()).to_string()));
        }

        let credentials = response
            .json::<Envelope<TokenPair>>()
            .and_then(Envelope::into_data)
            .and_then(TokenPair::into_credentials)
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;

        self.inner.store.set_credentials(&credentials).map_err(|e| ApiError::RefreshFailed(e.to_string()))?;
        Ok(credentials)
    }

    /// Second and final attempt: a 401 here is not recovered again.
    async fn replay(&self, request: &PendingRequest) -> Result<RawResponse, ApiError> {
        let response = self.inner.transport.send(request).await?;
        if response.status == 401 {
            return Err(ApiError::unauthorized(&response.text()));
        }
        check_status(response)
    }

    /// User-initiated sign-out: clear the store and publish an empty session.
    ///
    /// Waits for any in-flight refresh so a late token pair cannot be written
    /// back after the clear.
    pub(crate) async fn end_session(&self) {
        let _gate = self.inner.refresh_gate.lock().await;
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %e, "failed to clear credential store");
        }
        self.inner.session.send_replace(SessionSnapshot::default());
    }

    /// Terminal transition: clear the store, publish an empty session, redirect.
    pub(crate) fn expire_session(&self) {
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %e, "failed to clear credential store");
        }
        self.inner.session.send_replace(SessionSnapshot::default());
        self.inner.navigator.redirect_to_login();
    }
}

fn check_status(response: RawResponse) -> Result<RawResponse, ApiError> {
    if response.is_success() { Ok(response) } else { Err(ApiError::status(response.status, &response.text())) }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
