//! Authenticated client for the knowledge-base backend.
//!
//! Every request goes through [`ApiClient`], which attaches the stored bearer
//! token and, on a 401, refreshes the token pair once and replays the request.
//! Concurrent 401s share a single refresh. When the refresh fails the store is
//! cleared, the [`SessionContext`] snapshot drops to signed-out, and the
//! [`Navigator`] is told to go to the login page.

pub mod config;
pub mod error;
pub mod nav;
pub mod net;
pub mod services;
pub mod state;
pub mod store;

pub use config::ClientConfig;
pub use error::ApiError;
pub use nav::{Navigator, RouteTracker};
pub use net::ApiClient;
pub use state::{SessionContext, SessionSnapshot};
pub use store::{CachedUser, CredentialStore, Credentials, FileStore, MemoryStore};
