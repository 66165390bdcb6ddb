//! `/todos` handlers.
//!
//! Each handler maps one HTTP method onto one repository operation. Errors
//! short-circuit into [`AppError`], which logs and answers 500 with the
//! message as plain text.

use crate::error::AppError;
use crate::state::AppState;
use crate::WebResult;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    Json,
};
use todos_core::{Todo, TodoError};

/// Create or update a todo.
///
/// # Endpoint
///
/// ```text
/// POST /todos
/// ```
///
/// # Request
///
/// ```json
/// {"text": "do this"}
/// {"id": 1, "text": "do this", "done": true}
/// ```
///
/// A missing or zero `id` creates a todo; any other `id` updates it.
///
/// # Response
///
/// ```json
/// {"id": 1, "text": "do this", "done": false, "created": 1356724843.0}
/// ```
///
/// The body is buffered and decoded by hand rather than with the `Json`
/// extractor so that unreadable, oversized or malformed bodies go through the
/// same 500 error path as everything else.
///
/// # Errors
///
/// Decode or storage failure.
pub async fn save_todo(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> WebResult<Json<Todo>> {
    let body = body.map_err(|rejection| TodoError::Decode(rejection.body_text()))?;
    let todo: Todo = serde_json::from_slice(&body)?;
    let saved = state.todos.save(todo).await?;
    Ok(Json(saved))
}

/// List every todo, oldest first.
///
/// # Endpoint
///
/// ```text
/// GET /todos
/// ```
///
/// # Errors
///
/// Storage failure.
pub async fn list_todos(State(state): State<AppState>) -> WebResult<Json<Vec<Todo>>> {
    Ok(Json(state.todos.list_all().await?))
}

/// Delete every done todo in one transaction.
///
/// # Endpoint
///
/// ```text
/// DELETE /todos
/// ```
///
/// Answers 200 with an empty body, including when nothing was done.
///
/// # Errors
///
/// Storage failure; no todo is deleted in that case.
pub async fn delete_done_todos(State(state): State<AppState>) -> WebResult<StatusCode> {
    state.todos.delete_done().await?;
    Ok(StatusCode::OK)
}

/// Any method other than POST, GET or DELETE.
#[allow(clippy::unused_async)]
pub async fn unsupported_method(method: Method) -> AppError {
    tracing::debug!(%method, "Rejecting method on /todos");
    AppError::from(TodoError::UnsupportedMethod)
}
