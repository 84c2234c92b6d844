//! Stored files under `/v1/files`.
//!
//! Metadata routes are enveloped. Uploads post a multipart form, which the
//! pipeline can replay after a refresh like any other body. `serve` returns
//! the raw file bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::net::{ApiClient, Attachment, MultipartForm, PendingRequest};

const FILES_PATH: &str = "/v1/files";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    /// Server-side name, used by [`serve`].
    pub filename: String,
    pub original_name: String,
    /// Bytes.
    pub size: u64,
    pub mime_type: String,
    pub url: String,
    #[serde(default)]
    pub document_id: Option<String>,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestFile {
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub total_files: u64,
    pub total_size: u64,
    pub average_size: f64,
    #[serde(default)]
    pub largest_file: Option<LargestFile>,
}

/// Options for turning an upload straight into a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub title: String,
    pub tags: Vec<String>,
    pub is_public: Option<bool>,
}

/// The stored file and the document created from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedUpload {
    pub file: StoredFile,
    pub document: Value,
}

/// # Errors
///
/// Any pipeline error; [`ApiError::Encode`] for an invalid mime type.
pub async fn upload(client: &ApiClient, file: Attachment, document_id: Option<&str>) -> Result<StoredFile, ApiError> {
    let form = MultipartForm::new().file("file", file).text_opt("documentId", document_id);
    client.fetch_data(PendingRequest::post(format!("{FILES_PATH}/upload")).multipart(form)).await
}

/// Upload a file and create a document from its extracted text.
///
/// # Errors
///
/// Any pipeline error; [`ApiError::Encode`] for an invalid mime type.
pub async fn upload_and_extract(
    client: &ApiClient,
    file: Attachment,
    options: &ExtractOptions,
) -> Result<ExtractedUpload, ApiError> {
    let tags = (!options.tags.is_empty()).then(|| options.tags.join(","));
    let form = MultipartForm::new()
        .file("file", file)
        .text("title", &options.title)
        .text_opt("tags", tags)
        .text_opt("isPublic", options.is_public);
    client.fetch_data(PendingRequest::post(format!("{FILES_PATH}/upload-and-extract")).multipart(form)).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn list(client: &ApiClient) -> Result<Vec<StoredFile>, ApiError> {
    client.fetch_data(PendingRequest::get(FILES_PATH)).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn stats(client: &ApiClient) -> Result<FileStats, ApiError> {
    client.fetch_data(PendingRequest::get(format!("{FILES_PATH}/stats"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn by_document(client: &ApiClient, document_id: &str) -> Result<Vec<StoredFile>, ApiError> {
    client.fetch_data(PendingRequest::get(format!("{FILES_PATH}/document/{document_id}"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn get(client: &ApiClient, id: &str) -> Result<StoredFile, ApiError> {
    client.fetch_data(PendingRequest::get(format!("{FILES_PATH}/{id}"))).await
}

/// Download a file's contents by its server-side name.
///
/// # Errors
///
/// Any pipeline error.
pub async fn serve(client: &ApiClient, filename: &str) -> Result<Vec<u8>, ApiError> {
    let response = client.execute(PendingRequest::get(format!("{FILES_PATH}/serve/{filename}"))).await?;
    Ok(response.into_bytes())
}

/// # Errors
///
/// Any pipeline error.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.acknowledge(PendingRequest::delete(format!("{FILES_PATH}/{id}"))).await
}
