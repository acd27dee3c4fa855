//! Request-relative time.
//!
//! A [`RelativeTime`] remembers the instant a request became available and
//! measures elapsed time against an injectable [`Clock`]. Domain servers
//! consult it to decide how much of a request's timeout is left.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// The system's monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SteadyClock;

impl Clock for SteadyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Elapsed-time tracker anchored at the moment it was created.
#[derive(Clone)]
pub struct RelativeTime {
    clock: Arc<dyn Clock>,
    start: Instant,
}

impl RelativeTime {
    /// Anchors a new tracker at the clock's current time.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let start = clock.now();
        Self { clock, start }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    /// Returns how much of `timeout` remains, saturating at zero.
    pub fn time_left(&self, timeout: Duration) -> Duration {
        timeout.saturating_sub(self.elapsed())
    }

    pub fn expired(&self, timeout: Duration) -> bool {
        self.elapsed() >= timeout
    }
}

impl Default for RelativeTime {
    fn default() -> Self {
        Self::new(Arc::new(SteadyClock))
    }
}

impl fmt::Debug for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelativeTime")
            .field("elapsed", &self.elapsed())
            .finish()
    }
}
