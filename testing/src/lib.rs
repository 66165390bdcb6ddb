//! # Todos Testing
//!
//! Testing utilities for the todos service.
//!
//! This crate provides:
//! - [`InMemoryDatastore`]: `HashMap`-backed [`Datastore`](todos_core::Datastore)
//! - [`FailingDatastore`]: a datastore whose every call fails
//! - [`FixedClock`] / [`SteppingClock`]: deterministic time
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use todos_core::{Todo, TodoRepository};
//! use todos_testing::{test_clock, InMemoryDatastore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryDatastore::new();
//! let repo = TodoRepository::new(Arc::new(store.clone()), Arc::new(test_clock()));
//!
//! repo.save(Todo::new("buy milk")).await?;
//! assert_eq!(store.len(), 1);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Duration, Utc};
use todos_core::environment::Clock;

pub mod datastore_mocks;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todos_testing::mocks::FixedClock;
    /// use todos_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every read.
    ///
    /// Lets tests create several todos with distinct, predictable
    /// `created` values.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Start at `start`, advancing `step` after each reading.
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        #[allow(clippy::unwrap_used)] // Poisoning only follows a panicking test
        fn now(&self) -> DateTime<Utc> {
            let mut next = self.next.lock().unwrap();
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// The instant every test clock starts from: 2013-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_356_998_400, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Create a default fixed clock for tests (see [`test_epoch`]).
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// Clock starting at [`test_epoch`] and advancing one second per read.
    #[must_use]
    pub fn stepping_clock() -> SteppingClock {
        SteppingClock::new(test_epoch(), Duration::seconds(1))
    }
}

// Re-export commonly used items
pub use datastore_mocks::{FailingDatastore, InMemoryDatastore};
pub use mocks::{FixedClock, SteppingClock, stepping_clock, test_clock, test_epoch};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.timestamp(), 1_356_998_400);
    }

    #[test]
    fn test_stepping_clock_advances() {
        let clock = stepping_clock();
        let first = clock.now();
        let second = clock.now();
        assert_eq!(second - first, Duration::seconds(1));
        assert_eq!(first, test_epoch());
    }
}
