//! Datastore port.
//!
//! The [`Datastore`] trait models the external store the todo list is kept
//! in: records keyed under a parent list, an ancestor query ordered by
//! creation time, and an atomic "delete everything done" transaction.
//!
//! # Implementations
//!
//! - `PostgresDatastore` (in `todos-postgres`): production storage
//! - `InMemoryDatastore` (in `todos-testing`): fast, deterministic tests
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! repository can hold an `Arc<dyn Datastore>` and pick the backend at
//! startup.

use crate::error::StoreError;
use crate::todo::{ListKey, TodoId, TodoKey, TodoRecord};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Datastore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// A record together with the identifier taken from its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTodo {
    /// Identifier from the record's key.
    pub id: TodoId,
    /// Stored payload.
    pub record: TodoRecord,
}

/// Storage backend for todos.
///
/// Implementations must be `Send + Sync` to be shared across request tasks.
pub trait Datastore: Send + Sync {
    /// Write a record under `key`.
    ///
    /// - [`TodoKey::Incomplete`]: insert, assigning a fresh identifier that is
    ///   never reused within the list, even after deletion.
    /// - [`TodoKey::Complete`]: overwrite `text` and `done` of the existing
    ///   record. `created` is immutable and keeps its stored value.
    ///
    /// Returns the record as it is now stored.
    ///
    /// # Errors
    ///
    /// - `NotFound`: complete key with no matching record
    /// - `Database`: the write failed
    fn put(&self, key: TodoKey, record: TodoRecord) -> StoreFuture<'_, StoredTodo>;

    /// Load every record under `parent`, ordered by `created` ascending
    /// (ties by identifier). An empty list yields an empty vector.
    ///
    /// # Errors
    ///
    /// `Database` if the query fails.
    fn query_by_ancestor(&self, parent: ListKey) -> StoreFuture<'_, Vec<StoredTodo>>;

    /// In one transaction, select the keys of every `done` record under
    /// `parent` and delete exactly those. Either all are removed or none.
    ///
    /// Returns the identifiers that were deleted.
    ///
    /// # Errors
    ///
    /// - `Transaction`: the transaction could not begin or commit
    /// - `Database`: the query or delete failed (nothing is removed)
    fn delete_done(&self, parent: ListKey) -> StoreFuture<'_, Vec<TodoId>>;

    /// Cheap round-trip used by readiness checks.
    ///
    /// # Errors
    ///
    /// `Database` if the store is unreachable.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
