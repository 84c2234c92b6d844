//! Typed wrappers over the backend's REST endpoints.
//!
//! Each function builds a [`PendingRequest`](crate::net::PendingRequest) and
//! runs it through the [`ApiClient`](crate::net::ApiClient) pipeline, so every
//! endpoint gets bearer attachment and refresh-on-401 for free.

pub mod ai;
pub mod auth;
pub mod documents;
pub mod files;
pub mod mcp;
pub mod notes;
pub mod tasks;
pub mod users;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
