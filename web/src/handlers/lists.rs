//! Todo list endpoints.
//!
//! - `GET /api/todolists`
//! - `GET /api/todolists/:id`
//! - `POST /api/todolists`
//! - `PUT /api/todolists/:id`
//! - `DELETE /api/todolists/:id`

use crate::dto::{CreateListRequest, UpdateListRequest};
use crate::error::AppError;
use crate::extractors::ValidJson;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use todo_kv_core::{ListId, TodoList};

/// All lists, in no particular order.
///
/// ```bash
/// curl http://localhost:8000/api/todolists
/// ```
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<TodoList>>, AppError> {
    Ok(Json(state.lists.list_all().await?))
}

/// One list with its items.
pub async fn get_list(
    Path(list_id): Path<ListId>,
    State(state): State<AppState>,
) -> Result<Json<TodoList>, AppError> {
    state
        .lists
        .get(list_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("TodoList", list_id))
}

/// Create a list. Names are unique ignoring case and surrounding whitespace.
///
/// ```bash
/// curl -X POST http://localhost:8000/api/todolists \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Groceries"}'
/// ```
pub async fn create_list(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateListRequest>,
) -> Result<(StatusCode, Json<TodoList>), AppError> {
    let list = state.lists.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// Rename a list, keeping its items.
pub async fn update_list(
    Path(list_id): Path<ListId>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateListRequest>,
) -> Result<Json<TodoList>, AppError> {
    state
        .lists
        .update(list_id, request.into())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("TodoList", list_id))
}

/// Delete a list and its items.
pub async fn delete_list(
    Path(list_id): Path<ListId>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if state.lists.delete(list_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("TodoList", list_id))
    }
}
