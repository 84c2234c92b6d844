//! Navigation seam: where the user is, and the "go to login" signal.
//!
//! The pipeline never performs navigation itself. It asks the [`Navigator`]
//! for the current path (to skip recovery on auth pages) and emits a redirect
//! request when the session is gone; the embedding UI decides what that means.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

/// True for pages whose purpose is establishing a session.
#[must_use]
pub fn is_auth_page(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    path == LOGIN_PATH || path == SIGNUP_PATH
}

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    /// Terminal transition after an unrecoverable auth failure.
    fn redirect_to_login(&self);
}

/// Navigator backed by a watch channel so a UI loop can follow route changes.
#[derive(Debug)]
pub struct RouteTracker {
    route: watch::Sender<String>,
    redirects: AtomicUsize,
}

impl RouteTracker {
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        let (route, _) = watch::channel(initial.into());
        Self { route, redirects: AtomicUsize::new(0) }
    }

    /// Record a user-driven route change.
    pub fn navigate(&self, path: impl Into<String>) {
        self.route.send_replace(path.into());
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.route.subscribe()
    }

    /// Number of forced redirects to the login page so far.
    #[must_use]
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Default for RouteTracker {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for RouteTracker {
    fn current_path(&self) -> String {
        self.route.borrow().clone()
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        self.route.send_replace(LOGIN_PATH.to_owned());
        tracing::info!("redirecting to login");
    }
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;
