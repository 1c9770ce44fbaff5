//! Time Source Abstraction
//!
//! ## Implementation Requirements
//!
//! - `now()` returns milliseconds since boot as a wrapping `u32`
//! - The counter may wrap; consumers use wrapping subtraction
//! - Precision of 1 ms is assumed by the scheduler

use crate::time::Timestamp;

/// Source of time for the node
///
/// ```rust
/// use soilguard_core::traits::TimeSource;
/// use soilguard_core::time::Timestamp;
///
/// struct TickCounter {
///     ticks: u32,
/// }
///
/// impl TimeSource for TickCounter {
///     fn now(&self) -> Timestamp {
///         self.ticks
///     }
/// }
/// ```
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        T::now(self)
    }
}
