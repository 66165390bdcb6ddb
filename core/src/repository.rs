//! Persistence adapter.
//!
//! [`TodoRepository`] is the CRUD surface the HTTP layer talks to. Every call
//! is scoped to one [`ListKey`] and goes straight to the [`Datastore`]: no
//! caching, no retries. Store errors are returned verbatim.
//!
//! # Metrics
//!
//! - `todos_saved_total{op}` - saves by `op` (`create`, `update`)
//! - `todos_deleted_total` - todos removed by `delete_done`
//! - `todos_store_errors_total{op}` - failed datastore calls by operation

use crate::datastore::Datastore;
use crate::environment::Clock;
use crate::error::StoreError;
use crate::todo::{DEFAULT_LIST, ListKey, Todo};
use metrics::{counter, describe_counter};
use std::sync::Arc;

/// Register metric descriptions. Call once at startup.
pub fn describe_metrics() {
    describe_counter!("todos_saved_total", "Todos written, labelled create or update");
    describe_counter!("todos_deleted_total", "Done todos removed by bulk delete");
    describe_counter!(
        "todos_store_errors_total",
        "Datastore calls that failed, labelled by operation"
    );
}

/// CRUD over the todos of a single list.
#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn Datastore>,
    clock: Arc<dyn Clock>,
    list: ListKey,
}

impl TodoRepository {
    /// Repository over [`DEFAULT_LIST`].
    #[must_use]
    pub fn new(store: Arc<dyn Datastore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_list(store, clock, DEFAULT_LIST)
    }

    /// Repository over an explicit list.
    #[must_use]
    pub fn with_list(store: Arc<dyn Datastore>, clock: Arc<dyn Clock>, list: ListKey) -> Self {
        Self { store, clock, list }
    }

    /// The list this repository is scoped to.
    #[must_use]
    pub const fn list(&self) -> ListKey {
        self.list
    }

    /// Create or update a todo.
    ///
    /// An unsaved todo (`id == 0`) is stamped with the current time and
    /// inserted; the store assigns its id. A saved todo overwrites the stored
    /// text and done flag, keeping the original `created`.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the datastore, including `NotFound` when the
    /// id does not exist.
    pub async fn save(&self, mut todo: Todo) -> Result<Todo, StoreError> {
        let key = todo.key(self.list, self.clock.as_ref());
        let op = if key.id().is_some() { "update" } else { "create" };

        tracing::debug!(list = %self.list, op, "Saving todo");

        let stored = self
            .store
            .put(key, todo.record())
            .await
            .inspect_err(|e| record_failure("save", e))?;

        counter!("todos_saved_total", "op" => op).increment(1);
        tracing::info!(todo_id = %stored.id, op, "Todo saved");

        Ok(Todo::from_stored(stored.id, stored.record))
    }

    /// All todos of the list, oldest first.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let stored = self
            .store
            .query_by_ancestor(self.list)
            .await
            .inspect_err(|e| record_failure("list", e))?;

        tracing::debug!(list = %self.list, count = stored.len(), "Listed todos");

        Ok(stored
            .into_iter()
            .map(|s| Todo::from_stored(s.id, s.record))
            .collect())
    }

    /// Atomically delete every done todo. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// [`StoreError::Transaction`] or [`StoreError::Database`]; in both cases
    /// nothing was deleted.
    pub async fn delete_done(&self) -> Result<usize, StoreError> {
        let deleted = self
            .store
            .delete_done(self.list)
            .await
            .inspect_err(|e| record_failure("delete_done", e))?;

        counter!("todos_deleted_total").increment(deleted.len() as u64);
        tracing::info!(list = %self.list, deleted = deleted.len(), "Deleted done todos");

        Ok(deleted.len())
    }

    /// Check the datastore is reachable.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] if it is not.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

fn record_failure(op: &'static str, error: &StoreError) {
    counter!("todos_store_errors_total", "op" => op).increment(1);
    tracing::warn!(op, error = %error, "Datastore call failed");
}
