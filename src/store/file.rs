//! File-backed credential store.
//!
//! The three keys live in one JSON document. Every mutation rewrites the whole
//! document into a sibling temp file and renames it over the target, so a
//! concurrent reader sees either the old state or the new one, never a mix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{CachedUser, CredentialStore, Credentials, Persisted, StoreError};

/// Credential store persisted to a JSON file on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Persisted, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Persisted::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Persisted::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &Persisted) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(state)?;
        {
            let mut file = open_private(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under the in-process lock.
    fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Persisted) -> Result<(), StoreError>,
    {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut state = self.load()?;
        mutate(&mut state)?;
        self.save(&state)
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

impl CredentialStore for FileStore {
    fn credentials(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.load()?.credentials())
    }

    fn set_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.update(|state| {
            state.set_credentials(credentials);
            Ok(())
        })
    }

    fn set_session(&self, credentials: &Credentials, user: &CachedUser) -> Result<(), StoreError> {
        self.update(|state| {
            state.set_credentials(credentials);
            state.auth_user = Some(user.clone());
            Ok(())
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn cached_user(&self) -> Result<Option<CachedUser>, StoreError> {
        Ok(self.load()?.cached_user())
    }

    fn set_cached_user(&self, user: &CachedUser) -> Result<(), StoreError> {
        self.update(|state| state.set_cached_user(user))
    }

    fn clear_cached_user(&self) -> Result<(), StoreError> {
        self.update(|state| {
            state.auth_user = None;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
