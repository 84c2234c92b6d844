//! Tool execution endpoints under `/mcp`. Plain JSON bodies.
//!
//! Tool parameters and results are free-form JSON; only the framing around
//! them is typed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::net::{ApiClient, PendingRequest};

const MCP_PATH: &str = "/mcp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpHealth {
    pub healthy: bool,
    pub uptime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub tool_name: String,
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMetadata {
    pub execution_time: f64,
    pub tool_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub metadata: Option<ToolMetadata>,
}

#[derive(Serialize)]
struct BatchBody<'a> {
    tools: &'a [ToolCall],
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuickSearch {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuickNote {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Quick-action priorities are lower-case, unlike the tasks API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<QuickPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub documents: u64,
    pub notes: u64,
    pub tasks: u64,
    pub total_activity: u64,
}

/// # Errors
///
/// Any pipeline error.
pub async fn tools(client: &ApiClient) -> Result<Vec<McpTool>, ApiError> {
    client.fetch(PendingRequest::get(format!("{MCP_PATH}/tools"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn health(client: &ApiClient) -> Result<McpHealth, ApiError> {
    client.fetch(PendingRequest::get(format!("{MCP_PATH}/health"))).await
}

/// Run one tool. A tool-level failure is `Ok` with `success: false`.
///
/// # Errors
///
/// Any pipeline error.
pub async fn execute(client: &ApiClient, call: &ToolCall) -> Result<ToolResult, ApiError> {
    client.fetch(PendingRequest::post(format!("{MCP_PATH}/execute")).json(call)?).await
}

/// Run several tools; results come back in call order.
///
/// # Errors
///
/// Any pipeline error.
pub async fn execute_batch(client: &ApiClient, calls: &[ToolCall]) -> Result<Vec<ToolResult>, ApiError> {
    let request = PendingRequest::post(format!("{MCP_PATH}/execute-batch")).json(&BatchBody { tools: calls })?;
    client.fetch(request).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn quick_search_docs(client: &ApiClient, input: &QuickSearch) -> Result<Value, ApiError> {
    client.fetch(PendingRequest::post(format!("{MCP_PATH}/quick/search-docs")).json(input)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn quick_add_note(client: &ApiClient, input: &QuickNote) -> Result<Value, ApiError> {
    client.fetch(PendingRequest::post(format!("{MCP_PATH}/quick/add-note")).json(input)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn quick_create_task(client: &ApiClient, input: &QuickTask) -> Result<Value, ApiError> {
    client.fetch(PendingRequest::post(format!("{MCP_PATH}/quick/create-task")).json(input)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn user_stats(client: &ApiClient) -> Result<UserStats, ApiError> {
    client.fetch(PendingRequest::get(format!("{MCP_PATH}/quick/user-stats"))).await
}
