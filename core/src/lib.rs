//! # Todos Core
//!
//! Domain types and the persistence adapter for a single-user todo list.
//!
//! This crate knows nothing about HTTP or about any particular database. It
//! provides:
//!
//! - **Entity model** ([`todo`]): the [`Todo`] record, its identifier and the
//!   key-derivation rules that decide whether a save creates or updates.
//! - **Datastore port** ([`datastore`]): the [`Datastore`] trait, modelling an
//!   ancestor-keyed store with ordered queries and an atomic bulk delete.
//! - **Persistence adapter** ([`repository`]): [`TodoRepository`], the CRUD
//!   surface used by the web layer, always scoped to one [`ListKey`].
//! - **Environment** ([`environment`]): the injectable [`Clock`].
//!
//! ## Implementations
//!
//! - `PostgresDatastore` (in `todos-postgres`): production storage
//! - `InMemoryDatastore` (in `todos-testing`): fast, deterministic tests
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use todos_core::{SystemClock, Todo, TodoRepository};
//! use todos_testing::InMemoryDatastore;
//!
//! let repo = TodoRepository::new(Arc::new(InMemoryDatastore::new()), Arc::new(SystemClock));
//!
//! let saved = repo.save(Todo::new("buy milk")).await?;
//! assert!(saved.id.is_assigned());
//!
//! let todos = repo.list_all().await?;
//! assert_eq!(todos.len(), 1);
//! ```

pub mod datastore;
pub mod environment;
pub mod error;
pub mod repository;
pub mod todo;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use datastore::{Datastore, StoreFuture, StoredTodo};
pub use environment::{Clock, SystemClock};
pub use error::{StoreError, TodoError};
pub use repository::TodoRepository;
pub use todo::{DEFAULT_LIST, ListKey, Todo, TodoId, TodoKey, TodoRecord};
