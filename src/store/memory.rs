//! In-process credential store.

use std::sync::{Mutex, MutexGuard};

use super::{CachedUser, CredentialStore, Credentials, Persisted, StoreError};

/// Credential store that lives only as long as the process.
///
/// Used by tests and by embedders that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<Persisted>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a signed-in session.
    #[must_use]
    pub fn with_session(credentials: &Credentials, user: Option<&CachedUser>) -> Self {
        let mut slots = Persisted::default();
        slots.set_credentials(credentials);
        slots.auth_user = user.cloned();
        Self { slots: Mutex::new(slots) }
    }

    /// True when none of the three keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().map(|slots| *slots == Persisted::default()).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Persisted>, StoreError> {
        self.slots.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl CredentialStore for MemoryStore {
    fn credentials(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.lock()?.credentials())
    }

    fn set_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.lock()?.set_credentials(credentials);
        Ok(())
    }

    fn set_session(&self, credentials: &Credentials, user: &CachedUser) -> Result<(), StoreError> {
        let mut slots = self.lock()?;
        slots.set_credentials(credentials);
        slots.auth_user = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.lock()? = Persisted::default();
        Ok(())
    }

    fn cached_user(&self) -> Result<Option<CachedUser>, StoreError> {
        Ok(self.lock()?.cached_user())
    }

    fn set_cached_user(&self, user: &CachedUser) -> Result<(), StoreError> {
        self.lock()?.set_cached_user(user)
    }

    fn clear_cached_user(&self) -> Result<(), StoreError> {
        self.lock()?.auth_user = None;
        Ok(())
    }
}
