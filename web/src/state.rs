//! Application state for Axum handlers.

use todos_core::TodoRepository;

/// State shared across all HTTP handlers.
///
/// Cheap to clone: the repository only holds `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Persistence adapter for the default list.
    pub todos: TodoRepository,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(todos: TodoRepository) -> Self {
        Self { todos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Ensure AppState implements Clone (required for Axum)
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
