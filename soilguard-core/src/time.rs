//! Time management for the node
//!
//! Boards expose a free-running millisecond counter that wraps after about
//! 49.7 days. Everything here works on that wrapping `u32` directly: elapsed
//! time is `now.wrapping_sub(earlier)`, which stays correct across the wrap
//! as long as the real interval is shorter than the counter period.

use core::cell::Cell;

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since boot, wrapping at `u32::MAX`
pub type Timestamp = u32;

/// Milliseconds elapsed from `earlier` to `now`, tolerant of counter wrap
#[inline]
pub const fn elapsed_ms(earlier: Timestamp, now: Timestamp) -> u32 {
    now.wrapping_sub(earlier)
}

/// Controllable time source for tests and the simulator
///
/// Uses a `Cell` so a shared reference can be handed to the node as its
/// clock while the test keeps advancing it.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    now: Cell<Timestamp>,
}

impl MockTimeSource {
    /// Create a clock reading `start`
    pub const fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, timestamp: Timestamp) {
        self.now.set(timestamp);
    }

    /// Move forward, wrapping like the hardware counter
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Monotonic host clock truncated to the board's wrapping counter (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct StdClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start counting from zero now
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for StdClock {
    fn now(&self) -> Timestamp {
        // Truncation is the wrap.
        self.start.elapsed().as_millis() as Timestamp
    }
}
