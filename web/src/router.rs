//! Router composition.

use crate::handlers::{
    delete_done_todos, health_check, list_todos, readiness_check, save_todo, unsupported_method,
};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Largest accepted POST body. Larger bodies fail like malformed JSON.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Create the service router.
///
/// # Routes
///
/// - `POST /todos` - Create or update a todo
/// - `GET /todos` - List todos, oldest first
/// - `DELETE /todos` - Delete every done todo
/// - any other method on `/todos`, HEAD included - 500 "method not implemented"
/// - `GET /health` - Liveness
/// - `GET /health/ready` - Readiness (pings the datastore)
///
/// # Example
///
/// ```rust,ignore
/// let repository = TodoRepository::new(Arc::new(datastore), Arc::new(SystemClock));
/// let app = router(AppState::new(repository));
/// axum::serve(listener, app).await?;
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            post(save_todo)
                .get(list_todos)
                .delete(delete_done_todos)
                // axum would otherwise answer HEAD through the GET handler
                .head(unsupported_method)
                .fallback(unsupported_method)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
}
