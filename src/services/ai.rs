//! AI assistant endpoints under `/v1/ai`. Plain JSON bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::net::{ApiClient, PendingRequest};

const AI_PATH: &str = "/v1/ai";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiStatus {
    pub available: bool,
    pub model: String,
    pub version: String,
    pub uptime: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

/// Source to work on: inline text or a stored document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<SummaryLength>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub summary: String,
    pub original_length: u64,
    pub summary_length: u64,
    pub reduction_percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskInput {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerSource {
    pub text: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<AnswerSource>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub similarity: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPointsInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_points: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPoints {
    pub key_points: Vec<String>,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummarizeInput {
    pub doc_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<SummaryLength>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub doc_id: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BulkSummary {
    #[serde(default)]
    pub summaries: Vec<DocumentSummary>,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

/// # Errors
///
/// Any pipeline error.
pub async fn status(client: &ApiClient) -> Result<AiStatus, ApiError> {
    client.fetch(PendingRequest::get(format!("{AI_PATH}/status"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn summarize(client: &ApiClient, input: &SummarizeInput) -> Result<Summary, ApiError> {
    client.fetch(PendingRequest::post(format!("{AI_PATH}/summarize")).json(input)?).await
}

/// Retrieval-augmented question answering.
///
/// # Errors
///
/// Any pipeline error.
pub async fn ask(client: &ApiClient, input: &AskInput) -> Result<Answer, ApiError> {
    client.fetch(PendingRequest::post(format!("{AI_PATH}/ask")).json(input)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn search(client: &ApiClient, input: &SearchInput) -> Result<Vec<SearchHit>, ApiError> {
    client.fetch(PendingRequest::post(format!("{AI_PATH}/search")).json(input)?).await
}

/// Direct chat with optional inline context; returns the reply text.
///
/// # Errors
///
/// Any pipeline error.
pub async fn chat(client: &ApiClient, message: &str, context: Option<&str>) -> Result<String, ApiError> {
    let request = PendingRequest::post(format!("{AI_PATH}/chat")).json(&ChatBody { message, context })?;
    let reply: ChatReply = client.fetch(request).await?;
    Ok(reply.response)
}

/// # Errors
///
/// Any pipeline error.
pub async fn extract_key_points(client: &ApiClient, input: &KeyPointsInput) -> Result<KeyPoints, ApiError> {
    client.fetch(PendingRequest::post(format!("{AI_PATH}/extract-key-points")).json(input)?).await
}

/// Summarize several stored documents in one call.
///
/// # Errors
///
/// Any pipeline error.
pub async fn bulk_summarize(client: &ApiClient, input: &BulkSummarizeInput) -> Result<BulkSummary, ApiError> {
    client.fetch(PendingRequest::post(format!("{AI_PATH}/bulk-summarize")).json(input)?).await
}
