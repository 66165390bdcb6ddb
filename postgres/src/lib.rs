//! `PostgreSQL` datastore for the todos service.
//!
//! Implements the [`Datastore`] port from `todos-core` on top of sqlx:
//!
//! - Auto-assigned identifiers from a `BIGSERIAL` (never reused)
//! - Ancestor queries ordered by `created`
//! - Transactional "delete done" using `SELECT ... FOR UPDATE`
//! - Connection pooling
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE todos (
//!     list_name TEXT NOT NULL,
//!     id BIGSERIAL NOT NULL,
//!     text TEXT NOT NULL,
//!     done BOOLEAN NOT NULL DEFAULT FALSE,
//!     created TIMESTAMPTZ NOT NULL,
//!     PRIMARY KEY (list_name, id)
//! );
//! ```
//!
//! The identifier is the key column; it is never duplicated into the payload.
//!
//! # Example
//!
//! ```ignore
//! use todos_postgres::PostgresDatastore;
//!
//! let store = PostgresDatastore::new("postgres://localhost/todos").await?;
//! store.migrate().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use todos_core::{
    Datastore, ListKey, StoreError, StoreFuture, StoredTodo, TodoId, TodoKey, TodoRecord,
};

/// PostgreSQL-backed todo storage.
#[derive(Clone, Debug)]
pub struct PostgresDatastore {
    pool: PgPool,
}

impl PostgresDatastore {
    /// Connect with a small default pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if connection fails.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

        Ok(Self::from_pool(pool))
    }

    /// Use an existing connection pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `todos` table and its indexes if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn stored_from_row(row: &PgRow) -> Result<StoredTodo, sqlx::Error> {
    let created: DateTime<Utc> = row.try_get("created")?;
    Ok(StoredTodo {
        id: TodoId::new(row.try_get("id")?),
        record: TodoRecord {
            text: row.try_get("text")?,
            done: row.try_get("done")?,
            created,
        },
    })
}

fn database_error(context: &str, e: &sqlx::Error) -> StoreError {
    StoreError::Database(format!("{context}: {e}"))
}

impl Datastore for PostgresDatastore {
    fn put(&self, key: TodoKey, record: TodoRecord) -> StoreFuture<'_, StoredTodo> {
        Box::pin(async move {
            let row = match key {
                TodoKey::Incomplete { parent } => sqlx::query(
                    "INSERT INTO todos (list_name, text, done, created)
                     VALUES ($1, $2, $3, $4)
                     RETURNING id, text, done, created",
                )
                .bind(parent.name())
                .bind(&record.text)
                .bind(record.done)
                .bind(record.created)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database_error("Failed to insert todo", &e))?,

                // created is immutable, so only text and done are written
                TodoKey::Complete { parent, id } => sqlx::query(
                    "UPDATE todos SET text = $3, done = $4
                     WHERE list_name = $1 AND id = $2
                     RETURNING id, text, done, created",
                )
                .bind(parent.name())
                .bind(id.get())
                .bind(&record.text)
                .bind(record.done)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to update todo", &e))?
                .ok_or(StoreError::NotFound { list: parent, id })?,
            };

            let stored = stored_from_row(&row)
                .map_err(|e| database_error("Failed to decode todo", &e))?;
            tracing::debug!(list = %key.parent(), todo_id = %stored.id, "Put todo");
            Ok(stored)
        })
    }

    fn query_by_ancestor(&self, parent: ListKey) -> StoreFuture<'_, Vec<StoredTodo>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, text, done, created
                 FROM todos
                 WHERE list_name = $1
                 ORDER BY created ASC, id ASC",
            )
            .bind(parent.name())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to query todos", &e))?;

            rows.iter()
                .map(stored_from_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| database_error("Failed to decode todo", &e))
        })
    }

    fn delete_done(&self, parent: ListKey) -> StoreFuture<'_, Vec<TodoId>> {
        Box::pin(async move {
            // Dropping the transaction on any early return rolls it back
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| StoreError::Transaction(format!("Failed to start transaction: {e}")))?;

            // Keys only; the row locks keep concurrent updates out until commit
            let ids: Vec<i64> = sqlx::query_scalar(
                "SELECT id FROM todos
                 WHERE list_name = $1 AND done
                 FOR UPDATE",
            )
            .bind(parent.name())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| database_error("Failed to select done todos", &e))?;

            if !ids.is_empty() {
                sqlx::query("DELETE FROM todos WHERE list_name = $1 AND id = ANY($2)")
                    .bind(parent.name())
                    .bind(&ids[..])
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| database_error("Failed to delete done todos", &e))?;
            }

            tx.commit()
                .await
                .map_err(|e| StoreError::Transaction(format!("Failed to commit transaction: {e}")))?;

            tracing::debug!(list = %parent, deleted = ids.len(), "Deleted done todos");
            Ok(ids.into_iter().map(TodoId::new).collect())
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| database_error("Ping failed", &e))?;
            Ok(())
        })
    }
}
