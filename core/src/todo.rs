//! Todo entity model.
//!
//! A [`Todo`] is identified by a [`TodoKey`] living under a parent
//! [`ListKey`]. The numeric [`TodoId`] is part of the key, never part of the
//! stored payload ([`TodoRecord`]); reads always rebuild it from the key.
//!
//! # Wire format
//!
//! ```json
//! {"id": 1, "text": "do this", "done": false, "created": 1356724843.0}
//! ```
//!
//! `created` travels as epoch seconds in a JSON float. Every field is
//! optional on input: `id` defaults to 0 (not yet persisted), `text` to `""`,
//! `done` to `false`, and `created` to the Unix epoch (the server stamps or
//! preserves it, so a client value is never trusted).

use crate::environment::Clock;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The implicit list every todo belongs to.
pub const DEFAULT_LIST: ListKey = ListKey::new("default");

/// Parent key grouping todos.
///
/// There is exactly one list in practice ([`DEFAULT_LIST`]); it is still
/// passed explicitly to every storage call instead of living in global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListKey(&'static str);

impl ListKey {
    /// Create a list key from its name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The list name, as stored alongside each record.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Store-assigned todo identifier. Zero means "not yet persisted".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// The identifier of a todo that has never been saved.
    pub const UNASSIGNED: Self = Self(0);

    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether the store has assigned this identifier.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage key for a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoKey {
    /// New record; the store picks the identifier on insert.
    Incomplete {
        /// List the record is created under.
        parent: ListKey,
    },
    /// Existing record addressed by identifier.
    Complete {
        /// List the record lives under.
        parent: ListKey,
        /// Identifier within the list.
        id: TodoId,
    },
}

impl TodoKey {
    /// The list this key is scoped to.
    #[must_use]
    pub const fn parent(&self) -> ListKey {
        match self {
            Self::Incomplete { parent } | Self::Complete { parent, .. } => *parent,
        }
    }

    /// The identifier, if the key is complete.
    #[must_use]
    pub const fn id(&self) -> Option<TodoId> {
        match self {
            Self::Incomplete { .. } => None,
            Self::Complete { id, .. } => Some(*id),
        }
    }
}

/// The persisted payload of a todo. The identifier lives in the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRecord {
    /// Free-form text (not indexed).
    pub text: String,
    /// Completion flag (indexed).
    pub done: bool,
    /// First-save time (indexed, drives ordering).
    pub created: DateTime<Utc>,
}

/// A single todo as exchanged over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier; [`TodoId::UNASSIGNED`] until first saved.
    #[serde(default)]
    pub id: TodoId,
    /// Free-form text. Empty is allowed.
    #[serde(default)]
    pub text: String,
    /// Completion flag.
    #[serde(default)]
    pub done: bool,
    /// Creation time, set by the server on first save.
    #[serde(default = "unix_epoch", with = "epoch_seconds")]
    pub created: DateTime<Utc>,
}

impl Todo {
    /// A fresh, unsaved todo.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: TodoId::UNASSIGNED,
            text: text.into(),
            done: false,
            created: unix_epoch(),
        }
    }

    /// Derive the storage key for this todo under `list`.
    ///
    /// An unsaved todo gets an incomplete key and has `created` stamped from
    /// `clock` (truncated to microseconds, the precision the stores keep).
    /// A saved todo gets a complete key and is left untouched.
    pub fn key(&mut self, list: ListKey, clock: &dyn Clock) -> TodoKey {
        if self.id.is_assigned() {
            return TodoKey::Complete {
                parent: list,
                id: self.id,
            };
        }

        self.created = clock.now().trunc_subsecs(6);
        TodoKey::Incomplete { parent: list }
    }

    /// The payload to persist.
    #[must_use]
    pub fn record(&self) -> TodoRecord {
        TodoRecord {
            text: self.text.clone(),
            done: self.done,
            created: self.created,
        }
    }

    /// Rebuild a todo from its key identifier and stored payload.
    #[must_use]
    pub fn from_stored(id: TodoId, record: TodoRecord) -> Self {
        Self {
            id,
            text: record.text,
            done: record.done,
            created: record.created,
        }
    }
}

const fn unix_epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// Serde adapter: `DateTime<Utc>` as fractional epoch seconds.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const MICROS_PER_SECOND: f64 = 1_000_000.0;

    #[allow(clippy::cast_precision_loss)] // Micros fit an f64 mantissa until year ~2255
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.timestamp_micros() as f64 / MICROS_PER_SECOND)
    }

    #[allow(clippy::cast_possible_truncation)] // Range checked by from_timestamp_micros
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() {
            return Err(D::Error::custom("created must be a finite number of seconds"));
        }

        let micros = (seconds * MICROS_PER_SECOND).round() as i64;
        DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| D::Error::custom(format!("created {seconds} is out of range")))
    }
}
