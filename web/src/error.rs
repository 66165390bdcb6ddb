//! Error responses for web handlers.
//!
//! Every request-level failure becomes a `500 Internal Server Error` whose
//! body is the error message as plain text. There is no status distinction
//! between decode, storage and method errors; the kind is only visible in
//! the server log.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::fmt;
use todos_core::{StoreError, TodoError};

/// Application error type for web handlers.
///
/// Wraps a [`TodoError`] and implements Axum's `IntoResponse`, logging the
/// error before it is written out.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
///     Ok(Json(state.todos.list_all().await?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    error: TodoError,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        tracing::error!(
            status = %status,
            kind = self.error.kind(),
            error = ?self.error,
            "todo error"
        );

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.error.to_string(),
        )
            .into_response()
    }
}

impl From<TodoError> for AppError {
    fn from(error: TodoError) -> Self {
        Self { error }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        Self::from(TodoError::Storage(error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::from(TodoError::from(error))
    }
}
