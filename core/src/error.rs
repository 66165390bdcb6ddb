//! Error types.
//!
//! [`StoreError`] covers every failure raised by a [`Datastore`](crate::Datastore).
//! [`TodoError`] is the tagged error of a whole request: decoding, storage, or
//! an unsupported HTTP method. None of them are retried; callers surface the
//! message as-is.

use crate::todo::{ListKey, TodoId};
use thiserror::Error;

/// Errors raised by datastore operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying database rejected or failed the operation.
    #[error("datastore error: {0}")]
    Database(String),

    /// An update addressed an identifier that has no record.
    #[error("todo {id} not found in list {list}")]
    NotFound {
        /// List that was searched.
        list: ListKey,
        /// Identifier that was requested.
        id: TodoId,
    },

    /// A transaction could not be started or committed.
    #[error("transaction failed: {0}")]
    Transaction(String),
}

/// Request-level errors.
#[derive(Error, Debug)]
pub enum TodoError {
    /// The request body was not a valid todo.
    #[error("invalid todo: {0}")]
    Decode(String),

    /// The datastore failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// HTTP method outside POST, GET and DELETE.
    #[error("method not implemented")]
    UnsupportedMethod,
}

impl TodoError {
    /// Short, stable name of the error kind (for logs and metrics labels).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Storage(_) => "storage",
            Self::UnsupportedMethod => "unsupported_method",
        }
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::DEFAULT_LIST;

    #[test]
    fn test_unsupported_method_message() {
        assert_eq!(
            TodoError::UnsupportedMethod.to_string(),
            "method not implemented"
        );
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err = TodoError::from(StoreError::NotFound {
            list: DEFAULT_LIST,
            id: TodoId::new(3),
        });
        assert_eq!(err.to_string(), "todo 3 not found in list default");
        assert_eq!(err.kind(), "storage");
    }

    #[test]
    fn test_decode_error_from_serde() {
        let Err(json_err) = serde_json::from_str::<crate::Todo>("{") else {
            unreachable!("truncated JSON must not parse");
        };
        let err = TodoError::from(json_err);
        assert_eq!(err.kind(), "decode");
        assert!(err.to_string().starts_with("invalid todo: "));
    }
}
