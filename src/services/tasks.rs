//! Tasks under `/v1/tasks`. Every body is enveloped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::{ApiClient, PendingRequest};

const TASKS_PATH: &str = "/v1/tasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Listing filter; tags are sent as repeated `tags=` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub overdue_tasks: u64,
}

#[derive(Serialize)]
struct StatusBody {
    status: TaskStatus,
}

/// # Errors
///
/// Any pipeline error.
pub async fn create(client: &ApiClient, task: &CreateTask) -> Result<Task, ApiError> {
    client.fetch_data(PendingRequest::post(TASKS_PATH).json(task)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn list(client: &ApiClient, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
    let request = PendingRequest::get(TASKS_PATH)
        .query_opt("status", filter.status)
        .query_opt("priority", filter.priority)
        .query_all("tags", &filter.tags);
    client.fetch_data(request).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn stats(client: &ApiClient) -> Result<TaskStats, ApiError> {
    client.fetch_data(PendingRequest::get(format!("{TASKS_PATH}/stats"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn upcoming(client: &ApiClient) -> Result<Vec<Task>, ApiError> {
    client.fetch_data(PendingRequest::get(format!("{TASKS_PATH}/upcoming"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn overdue(client: &ApiClient) -> Result<Vec<Task>, ApiError> {
    client.fetch_data(PendingRequest::get(format!("{TASKS_PATH}/overdue"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn get(client: &ApiClient, id: &str) -> Result<Task, ApiError> {
    client.fetch_data(PendingRequest::get(format!("{TASKS_PATH}/{id}"))).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn update(client: &ApiClient, id: &str, changes: &UpdateTask) -> Result<Task, ApiError> {
    client.fetch_data(PendingRequest::patch(format!("{TASKS_PATH}/{id}")).json(changes)?).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn update_status(client: &ApiClient, id: &str, status: TaskStatus) -> Result<Task, ApiError> {
    let request = PendingRequest::patch(format!("{TASKS_PATH}/{id}/status")).json(&StatusBody { status })?;
    client.fetch_data(request).await
}

/// # Errors
///
/// Any pipeline error.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.acknowledge(PendingRequest::delete(format!("{TASKS_PATH}/{id}"))).await
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
