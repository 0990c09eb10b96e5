//! Wall-clock abstraction
//!
//! Token expiry and certificate warnings are computed from the local clock.
//! Components take a [`Clock`] so tests can move time forward without
//! waiting.
//!
//! ```
//! use std::time::Duration;
//!
//! use bankpartner_core::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now_utc();
//! clock.advance(Duration::from_secs(61));
//! assert_eq!((clock.now_utc() - start).num_seconds(), 61);
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of the current UTC time
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic tests
///
/// Clones share the same instant, so a clone handed to a component can be
/// advanced from the test body.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Start at the current real time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(instant)) }
    }

    pub fn advance(&self, duration: Duration) {
        let step = chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        *self.now.lock() += step;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
