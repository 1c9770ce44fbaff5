//! Host clock and delay
//!
//! In wall-clock mode delays really sleep and time comes from the host's
//! monotonic clock. In stepped mode (`--fast`) nothing sleeps: every delay
//! advances a shared simulated counter, so an hour of cycles runs in
//! milliseconds with identical output.

use std::{rc::Rc, thread, time::Duration};

use embedded_hal::delay::DelayNs;
use soilguard_core::{
    time::{MockTimeSource, StdClock},
    TimeSource, Timestamp,
};

/// Time source shared by the node and the simulated probes
#[derive(Debug, Clone)]
pub enum SimClock {
    /// Host monotonic clock
    Wall(StdClock),
    /// Counter advanced only by [`SimDelay`]
    Stepped(Rc<MockTimeSource>),
}

impl SimClock {
    pub fn wall() -> Self {
        SimClock::Wall(StdClock::new())
    }

    pub fn stepped() -> Self {
        SimClock::Stepped(Rc::new(MockTimeSource::new(0)))
    }
}

impl TimeSource for SimClock {
    fn now(&self) -> Timestamp {
        match self {
            SimClock::Wall(clock) => clock.now(),
            SimClock::Stepped(clock) => clock.now(),
        }
    }
}

/// Blocking delay matching the clock mode
#[derive(Debug, Clone)]
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: SimClock) -> Self {
        Self { clock }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        match &self.clock {
            SimClock::Wall(_) => thread::sleep(Duration::from_nanos(u64::from(ns))),
            SimClock::Stepped(clock) => clock.advance(ns / 1_000_000),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        match &self.clock {
            SimClock::Wall(_) => thread::sleep(Duration::from_millis(u64::from(ms))),
            SimClock::Stepped(clock) => clock.advance(ms),
        }
    }
}
