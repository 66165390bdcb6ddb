//! In-memory datastores
//!
//! - [`InMemoryDatastore`]: `HashMap`-based storage with the same semantics
//!   as the Postgres backend (monotonic ids, immutable `created`, atomic
//!   delete of done todos). Used by tests and served by the server when
//!   `STORAGE_BACKEND=memory`.
//! - [`FailingDatastore`]: every call fails, for exercising error paths

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use todos_core::{Datastore, ListKey, StoreError, StoreFuture, StoredTodo, TodoId, TodoKey, TodoRecord};

/// Records of one list.
#[derive(Debug, Default)]
struct ListEntries {
    /// Last identifier handed out; identifiers are never reused.
    last_id: i64,
    records: BTreeMap<TodoId, TodoRecord>,
}

/// In-memory datastore for fast, deterministic testing.
///
/// Also a supported backend for running the server without Postgres. All
/// state is lost when the last clone is dropped.
///
/// Every critical section leaves the map consistent, so a lock poisoned by a
/// panicking holder is recovered rather than propagated.
///
/// # Example
///
/// ```
/// use todos_core::{Datastore, DEFAULT_LIST, TodoKey, TodoRecord};
/// use todos_testing::{test_epoch, InMemoryDatastore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDatastore::new();
/// let record = TodoRecord { text: "x".into(), done: false, created: test_epoch() };
///
/// let stored = store.put(TodoKey::Incomplete { parent: DEFAULT_LIST }, record).await?;
/// assert_eq!(stored.id.get(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDatastore {
    lists: Arc<RwLock<HashMap<ListKey, ListEntries>>>,
}

impl InMemoryDatastore {
    /// Create a new empty datastore
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ListKey, ListEntries>> {
        self.lists.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ListKey, ListEntries>> {
        self.lists.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total number of stored todos across all lists
    #[must_use]
    pub fn len(&self) -> usize {
        self.read()
            .values()
            .map(|entries| entries.records.len())
            .sum()
    }

    /// Check if no todos are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a single record
    #[must_use]
    pub fn get(&self, list: ListKey, id: TodoId) -> Option<TodoRecord> {
        self.read()
            .get(&list)
            .and_then(|entries| entries.records.get(&id).cloned())
    }

    /// Remove every record (identifier counters are kept, so ids stay unique)
    pub fn clear(&self) {
        for entries in self.write().values_mut() {
            entries.records.clear();
        }
    }
}

impl Datastore for InMemoryDatastore {
    fn put(&self, key: TodoKey, record: TodoRecord) -> StoreFuture<'_, StoredTodo> {
        Box::pin(async move {
            let mut lists = self.write();
            let entries = lists.entry(key.parent()).or_default();

            match key {
                TodoKey::Incomplete { .. } => {
                    entries.last_id += 1;
                    let id = TodoId::new(entries.last_id);
                    entries.records.insert(id, record.clone());
                    Ok(StoredTodo { id, record })
                }
                TodoKey::Complete { parent, id } => {
                    let existing = entries
                        .records
                        .get_mut(&id)
                        .ok_or(StoreError::NotFound { list: parent, id })?;
                    existing.text = record.text;
                    existing.done = record.done;
                    Ok(StoredTodo {
                        id,
                        record: existing.clone(),
                    })
                }
            }
        })
    }

    fn query_by_ancestor(&self, parent: ListKey) -> StoreFuture<'_, Vec<StoredTodo>> {
        Box::pin(async move {
            let lists = self.read();
            let mut stored: Vec<StoredTodo> = lists
                .get(&parent)
                .map(|entries| {
                    entries
                        .records
                        .iter()
                        .map(|(id, record)| StoredTodo {
                            id: *id,
                            record: record.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            stored.sort_by(|a, b| {
                a.record
                    .created
                    .cmp(&b.record.created)
                    .then(a.id.cmp(&b.id))
            });
            Ok(stored)
        })
    }

    fn delete_done(&self, parent: ListKey) -> StoreFuture<'_, Vec<TodoId>> {
        Box::pin(async move {
            // One write lock spans the select and the delete
            let mut lists = self.write();
            let Some(entries) = lists.get_mut(&parent) else {
                return Ok(Vec::new());
            };

            let done: Vec<TodoId> = entries
                .records
                .iter()
                .filter(|(_, record)| record.done)
                .map(|(id, _)| *id)
                .collect();

            for id in &done {
                entries.records.remove(id);
            }

            tracing::debug!(list = %parent, deleted = done.len(), "In-memory delete_done");
            Ok(done)
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Datastore whose every call fails with [`StoreError::Database`].
#[derive(Clone, Debug)]
pub struct FailingDatastore {
    message: String,
}

impl FailingDatastore {
    /// Fail every call with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Database(self.message.clone())
    }
}

impl Datastore for FailingDatastore {
    fn put(&self, _key: TodoKey, _record: TodoRecord) -> StoreFuture<'_, StoredTodo> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }

    fn query_by_ancestor(&self, _parent: ListKey) -> StoreFuture<'_, Vec<StoredTodo>> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }

    fn delete_done(&self, _parent: ListKey) -> StoreFuture<'_, Vec<TodoId>> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }
}
