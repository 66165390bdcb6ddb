//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod health;
pub mod todos;

// Re-export common handler utilities
pub use health::{health_check, readiness_check};
pub use todos::{delete_done_todos, list_todos, save_todo, unsupported_method};
