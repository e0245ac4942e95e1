//! Todo item endpoints, nested under a list.
//!
//! - `GET /api/todolists/:list_id/items`
//! - `GET /api/todolists/:list_id/items/:item_id`
//! - `POST /api/todolists/:list_id/items`
//! - `PUT /api/todolists/:list_id/items/:item_id`
//! - `PATCH /api/todolists/:list_id/items/:item_id/toggle`
//! - `DELETE /api/todolists/:list_id/items/:item_id`
//! - `POST /api/todolists/:list_id/items/complete-all`
//!
//! Create and update check title uniqueness here before calling into
//! `ItemOperations`, which checks again against the state it loads.

use crate::dto::{CreateItemRequest, JobQueuedResponse, UpdateItemRequest};
use crate::error::AppError;
use crate::extractors::{CorrelationId, ValidJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use todo_kv_core::{ItemId, ListId, TodoError, TodoItem};

fn item_not_found(list_id: ListId, item_id: ItemId) -> AppError {
    AppError::not_found_message(format!(
        "Item with id {item_id} not found in TodoList {list_id}"
    ))
}

fn duplicate_title(title: &str) -> AppError {
    TodoError::DuplicateTitle {
        title: title.to_string(),
    }
    .into()
}

/// All items of a list, in insertion order.
pub async fn list_items(
    Path(list_id): Path<ListId>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoItem>>, AppError> {
    state
        .items
        .list_items(list_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("TodoList", list_id))
}

/// One item.
pub async fn get_item(
    Path((list_id, item_id)): Path<(ListId, ItemId)>,
    State(state): State<AppState>,
) -> Result<Json<TodoItem>, AppError> {
    state
        .items
        .get_item(list_id, item_id)
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(list_id, item_id))
}

/// Add an item to a list.
///
/// ```bash
/// curl -X POST http://localhost:8000/api/todolists/1/items \
///   -H "Content-Type: application/json" \
///   -d '{"title": "Milk", "description": "2 litres"}'
/// ```
pub async fn create_item(
    Path(list_id): Path<ListId>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<TodoItem>), AppError> {
    if let Some(list) = state.lists.get(list_id).await? {
        if list.title_taken(&request.title, None) {
            return Err(duplicate_title(&request.title));
        }
    }

    let item = state
        .items
        .create_item(list_id, request.into())
        .await?
        .ok_or_else(|| AppError::not_found("TodoList", list_id))?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Partially update an item.
pub async fn update_item(
    Path((list_id, item_id)): Path<(ListId, ItemId)>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateItemRequest>,
) -> Result<Json<TodoItem>, AppError> {
    let Some(list) = state.lists.get(list_id).await? else {
        return Err(item_not_found(list_id, item_id));
    };
    if list.find_item(item_id).is_none() {
        return Err(item_not_found(list_id, item_id));
    }
    if let Some(title) = &request.title {
        if list.title_taken(title, Some(item_id)) {
            return Err(duplicate_title(title));
        }
    }

    state
        .items
        .update_item(list_id, item_id, request.into())
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(list_id, item_id))
}

/// Flip an item's completion flag.
pub async fn toggle_item(
    Path((list_id, item_id)): Path<(ListId, ItemId)>,
    State(state): State<AppState>,
) -> Result<Json<TodoItem>, AppError> {
    state
        .items
        .toggle_completion(list_id, item_id)
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(list_id, item_id))
}

/// Remove an item.
pub async fn delete_item(
    Path((list_id, item_id)): Path<(ListId, ItemId)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if state.items.delete_item(list_id, item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(item_not_found(list_id, item_id))
    }
}

/// Queue a job that completes every item of the list.
///
/// Always accepted: a missing list is reported through the job status, not
/// here.
///
/// ```bash
/// curl -X POST http://localhost:8000/api/todolists/1/items/complete-all
/// # {"message":"queued job","job_id":"...","todo_list_id":1,"check_status":"/api/jobs/..."}
/// ```
pub async fn complete_all(
    Path(list_id): Path<ListId>,
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Result<(StatusCode, Json<JobQueuedResponse>), AppError> {
    let job_id = state
        .jobs
        .submit(Arc::clone(&state.complete_all), list_id)
        .await?;

    tracing::info!(
        correlation_id = %correlation_id.0,
        list_id = %list_id,
        job_id = %job_id,
        "Queued complete-all job"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(JobQueuedResponse::new(job_id.to_string(), list_id)),
    ))
}
