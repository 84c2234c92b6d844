//! Notes CRUD under `/notes`. Plain JSON bodies.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::{ApiClient, PendingRequest};

const NOTES_PATH: &str = "/notes";
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    pub total_notes: u64,
    pub notes_with_tags: u64,
    pub notes_with_documents: u64,
}

/// # Errors
///
/// Any pipeline error.
pub async fn create(client: &ApiClient, note: &CreateNote) -> Result<Note, ApiError> {
    client.fetch(PendingRequest::post(NOTES_PATH).json(note)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn list(client: &ApiClient) -> Result<Vec<Note>, ApiError> {
    client.fetch(PendingRequest::get(NOTES_PATH)).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn stats(client: &ApiClient) -> Result<NoteStats, ApiError> {
    client.fetch(PendingRequest::get(format!("{NOTES_PATH}/stats"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn recent(client: &ApiClient, limit: u32) -> Result<Vec<Note>, ApiError> {
    client.fetch(PendingRequest::get(format!("{NOTES_PATH}/recent")).query("limit", limit)).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn by_document(client: &ApiClient, document_id: &str) -> Result<Vec<Note>, ApiError> {
    client.fetch(PendingRequest::get(format!("{NOTES_PATH}/document/{document_id}"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn get(client: &ApiClient, id: &str) -> Result<Note, ApiError> {
    client.fetch(PendingRequest::get(format!("{NOTES_PATH}/{id}"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn update(client: &ApiClient, id: &str, changes: &UpdateNote) -> Result<Note, ApiError> {
    client.fetch(PendingRequest::patch(format!("{NOTES_PATH}/{id}")).json(changes)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.discard(PendingRequest::delete(format!("{NOTES_PATH}/{id}"))).await
}
