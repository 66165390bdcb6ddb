//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check the datastore.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check: pings the datastore.
///
/// # Status Codes
///
/// - 200 OK: datastore reachable
/// - 503 Service Unavailable: datastore ping failed
///
/// # Endpoint
///
/// ```text
/// GET /health/ready
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.todos.ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "not ready")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use todos_core::TodoRepository;
    use todos_testing::{FailingDatastore, InMemoryDatastore, test_clock};

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_with_reachable_store() {
        let state = AppState::new(TodoRepository::new(
            Arc::new(InMemoryDatastore::new()),
            Arc::new(test_clock()),
        ));

        let (status, body) = readiness_check(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ready");
    }

    #[tokio::test]
    async fn test_readiness_with_unreachable_store() {
        let state = AppState::new(TodoRepository::new(
            Arc::new(FailingDatastore::new("connection refused")),
            Arc::new(test_clock()),
        ));

        let (status, _) = readiness_check(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
