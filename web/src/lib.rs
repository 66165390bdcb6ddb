//! Axum HTTP surface for the todos service.
//!
//! A single resource, `/todos`, dispatched by method:
//!
//! ```text
//! POST   /todos   body: Todo JSON   → saved Todo JSON (id and created assigned)
//! GET    /todos                     → JSON array, oldest first
//! DELETE /todos                     → empty body; removes every done todo
//! *      /todos                     → 500 "method not implemented"
//! ```
//!
//! Plus liveness and readiness probes under `/health`.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at the router (correlation ID + trace span)
//! 2. **Decode** the JSON body for writes
//! 3. **Call** the [`TodoRepository`](todos_core::TodoRepository)
//! 4. **Encode** the result as JSON, or turn the error into a 500 plain-text
//!    response and log it
//!
//! # Example
//!
//! ```ignore
//! use todos_web::{router, AppState};
//!
//! let app = router(AppState::new(repository));
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::{router, MAX_BODY_BYTES};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
