//! Documents under `/docs`. Plain JSON bodies, except file-backed creation
//! which posts a multipart form to the same route.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::{ApiClient, Attachment, MultipartForm, PendingRequest};

const DOCS_PATH: &str = "/docs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Text,
    Pdf,
    Doc,
    Docx,
    Txt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounters {
    pub views: u64,
    pub downloads: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    pub user_id: String,
    #[serde(default)]
    pub stats: DocumentCounters,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Metadata sent alongside an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpload {
    pub title: String,
    /// Sent as one comma-joined field.
    pub tags: Vec<String>,
    pub is_public: Option<bool>,
}

/// Search over public documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total_documents: u64,
    pub public_documents: u64,
    pub private_documents: u64,
    /// Bytes.
    pub total_size: u64,
}

/// # Errors
///
/// Any pipeline error.
pub async fn create(client: &ApiClient, document: &CreateDocument) -> Result<Document, ApiError> {
    client.fetch(PendingRequest::post(DOCS_PATH).json(document)?).await
}

/// Create a document from a file; the backend extracts its text.
///
/// # Errors
///
/// Any pipeline error; [`ApiError::Encode`] for an invalid mime type.
pub async fn upload(client: &ApiClient, upload: &DocumentUpload, file: Attachment) -> Result<Document, ApiError> {
    let tags = (!upload.tags.is_empty()).then(|| upload.tags.join(","));
    let form = MultipartForm::new()
        .text("title", &upload.title)
        .file("file", file)
        .text_opt("tags", tags)
        .text_opt("isPublic", upload.is_public);
    client.fetch(PendingRequest::post(DOCS_PATH).multipart(form)).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn search(client: &ApiClient, query: &DocumentQuery) -> Result<Vec<Document>, ApiError> {
    let request = PendingRequest::get(DOCS_PATH)
        .query_opt("search", query.search.as_deref())
        .query_all("tags", &query.tags)
        .query_opt("page", query.page)
        .query_opt("limit", query.limit);
    client.fetch(request).await
}

/// Documents owned by the signed-in user.
///
/// # Errors
///
/// Any pipeline error.
pub async fn mine(client: &ApiClient) -> Result<Vec<Document>, ApiError> {
    client.fetch(PendingRequest::get(format!("{DOCS_PATH}/my-docs"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn tags(client: &ApiClient) -> Result<Vec<String>, ApiError> {
    client.fetch(PendingRequest::get(format!("{DOCS_PATH}/tags"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn stats(client: &ApiClient) -> Result<DocumentStats, ApiError> {
    client.fetch(PendingRequest::get(format!("{DOCS_PATH}/stats"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn get(client: &ApiClient, id: &str) -> Result<Document, ApiError> {
    client.fetch(PendingRequest::get(format!("{DOCS_PATH}/{id}"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn update(client: &ApiClient, id: &str, changes: &UpdateDocument) -> Result<Document, ApiError> {
    client.fetch(PendingRequest::patch(format!("{DOCS_PATH}/{id}")).json(changes)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.discard(PendingRequest::delete(format!("{DOCS_PATH}/{id}"))).await
}
