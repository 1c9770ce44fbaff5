//! Fixed-Interval Cycle Timing
//!
//! The scheduler never sleeps. It compares the current time with the last
//! fire time on every call and says whether a cycle is due, so the caller's
//! loop stays free to do other work between cycles.
//!
//! ## Wraparound
//!
//! Time is a `u32` millisecond counter that wraps after ~49.7 days. Elapsed
//! time is `now.wrapping_sub(last_fire)`, which stays correct across the
//! wrap as long as polls are less than one full counter period apart:
//!
//! ```text
//! last_fire = 0xFFFF_F000   now = 0x0000_0388
//! now - last_fire (wrapping) = 0x1388 = 5000  → fires
//! ```

use core::convert::Infallible;

use crate::{
    constants::time::REPORT_INTERVAL_MS,
    errors::{ConfigError, ConfigResult},
    time::{elapsed_ms, Timestamp},
};

/// Decides when the next acquisition cycle runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleScheduler {
    interval_ms: u32,
    last_fire: Timestamp,
}

impl Default for CycleScheduler {
    fn default() -> Self {
        Self {
            interval_ms: REPORT_INTERVAL_MS,
            last_fire: 0,
        }
    }
}

impl CycleScheduler {
    /// Scheduler whose clock starts at 0; first fire at `interval_ms`
    pub fn new(interval_ms: u32) -> ConfigResult<Self> {
        Self::starting_at(interval_ms, 0)
    }

    /// Scheduler whose first fire is one interval after `start`
    pub fn starting_at(interval_ms: u32, start: Timestamp) -> ConfigResult<Self> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self {
            interval_ms,
            last_fire: start,
        })
    }

    /// Whether a cycle is due at `now`; records `now` as the fire time if so
    pub fn tick(&mut self, now: Timestamp) -> bool {
        if elapsed_ms(self.last_fire, now) >= self.interval_ms {
            self.last_fire = now;
            true
        } else {
            false
        }
    }

    /// [`tick`](Self::tick) in `nb` form: `WouldBlock` until a cycle is due
    pub fn poll(&mut self, now: Timestamp) -> nb::Result<(), Infallible> {
        if self.tick(now) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Restart the interval from `now`
    pub fn reset(&mut self, now: Timestamp) {
        self.last_fire = now;
    }

    /// Milliseconds between cycles
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Time of the last fire (or of start/reset)
    pub fn last_fire(&self) -> Timestamp {
        self.last_fire
    }

    /// Milliseconds until the next cycle is due, 0 if overdue
    pub fn remaining_ms(&self, now: Timestamp) -> u32 {
        self.interval_ms
            .saturating_sub(elapsed_ms(self.last_fire, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_interval_boundaries() {
        let mut scheduler = CycleScheduler::new(5000).unwrap();

        let fired: Vec<u32> = [0, 4999, 5000, 9999, 10000]
            .into_iter()
            .filter(|&now| scheduler.tick(now))
            .collect();

        assert_eq!(fired, vec![5000, 10000]);
    }

    #[test]
    fn survives_counter_wrap() {
        let start = u32::MAX - 1000;
        let mut scheduler = CycleScheduler::starting_at(5000, start).unwrap();

        assert!(!scheduler.tick(u32::MAX));
        assert!(!scheduler.tick(3998));
        assert!(scheduler.tick(3999));
        assert_eq!(scheduler.last_fire(), 3999);
        assert!(scheduler.tick(8999));
    }

    #[test]
    fn late_poll_fires_once() {
        let mut scheduler = CycleScheduler::new(5000).unwrap();

        assert!(scheduler.tick(17_000));
        assert!(!scheduler.tick(17_001));
        assert!(scheduler.tick(22_000));
    }

    #[test]
    fn nb_form() {
        let mut scheduler = CycleScheduler::new(100).unwrap();

        assert_eq!(scheduler.poll(50), Err(nb::Error::WouldBlock));
        assert_eq!(scheduler.poll(100), Ok(()));
        assert_eq!(scheduler.remaining_ms(150), 50);
        assert_eq!(scheduler.remaining_ms(900), 0);
    }

    #[test]
    fn zero_interval_rejected() {
        assert_eq!(CycleScheduler::new(0), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn reset_restarts_interval() {
        let mut scheduler = CycleScheduler::new(1000).unwrap();
        scheduler.reset(700);

        assert!(!scheduler.tick(1000));
        assert!(scheduler.tick(1700));
        assert_eq!(CycleScheduler::default().interval_ms(), REPORT_INTERVAL_MS);
    }
}
