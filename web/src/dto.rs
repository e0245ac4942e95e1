//! Request and response bodies.
//!
//! Request types validate themselves (see [`Validate`]) and convert into the
//! core input types once valid.

use crate::error::AppError;
use crate::extractors::Validate;
use serde::{Deserialize, Serialize};
use todo_kv_core::{
    ItemPatch, JobRecord, JobStatus, ListId, ListPatch, NewTodoItem, NewTodoList,
};

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// ============================================================================
// Lists
// ============================================================================

/// Body of `POST /api/todolists`.
#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    /// List name
    pub name: String,
}

impl Validate for CreateListRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name)
    }
}

impl From<CreateListRequest> for NewTodoList {
    fn from(request: CreateListRequest) -> Self {
        Self::new(request.name)
    }
}

/// Body of `PUT /api/todolists/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    /// New list name
    pub name: String,
}

impl Validate for UpdateListRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name)
    }
}

impl From<UpdateListRequest> for ListPatch {
    fn from(request: UpdateListRequest) -> Self {
        Self::new(request.name)
    }
}

// ============================================================================
// Items
// ============================================================================

/// Body of `POST /api/todolists/{id}/items`.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Item title
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Initial completion state
    #[serde(default)]
    pub completed: bool,
}

impl Validate for CreateItemRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_text("title", &self.title)
    }
}

impl From<CreateItemRequest> for NewTodoItem {
    fn from(request: CreateItemRequest) -> Self {
        let item = Self::new(request.title).with_completed(request.completed);
        match request.description {
            Some(description) => item.with_description(description),
            None => item,
        }
    }
}

/// Body of `PUT /api/todolists/{id}/items/{item_id}`. Absent fields keep
/// their current value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New completion state
    #[serde(default)]
    pub completed: Option<bool>,
}

impl Validate for UpdateItemRequest {
    fn validate(&self) -> Result<(), AppError> {
        match &self.title {
            Some(title) => require_text("title", title),
            None => Ok(()),
        }
    }
}

impl From<UpdateItemRequest> for ItemPatch {
    fn from(request: UpdateItemRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            completed: request.completed,
        }
    }
}

// ============================================================================
// Jobs
// ============================================================================

/// Response of `POST /api/todolists/{id}/items/complete-all`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobQueuedResponse {
    /// Always `queued job`
    pub message: String,
    /// Identifier to poll
    pub job_id: String,
    /// List the job targets
    pub todo_list_id: ListId,
    /// Status URL for the job
    pub check_status: String,
}

impl JobQueuedResponse {
    /// Build the response for a freshly queued job.
    #[must_use]
    pub fn new(job_id: String, todo_list_id: ListId) -> Self {
        Self {
            message: "queued job".to_string(),
            check_status: format!("/api/jobs/{job_id}"),
            job_id,
            todo_list_id,
        }
    }
}

/// Response of `GET /api/jobs/{job_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    /// Job identifier
    pub id: String,
    /// `queued`, `running`, `finished` or `failed`
    pub status: JobStatus,
    /// Handler output once finished
    pub result: Option<serde_json::Value>,
    /// Failure description once failed
    pub error: Option<String>,
}

impl From<JobRecord> for JobStatusResponse {
    fn from(record: JobRecord) -> Self {
        Self {
            id: record.id.to_string(),
            status: record.status,
            result: record.result,
            error: record.error,
        }
    }
}

/// Response of `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}
