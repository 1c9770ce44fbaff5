//! Host stand-ins for the board peripherals
//!
//! Handles are shared through `Rc` so a test can keep changing what a probe
//! reads, or inspect what a pin did, after the peripheral has been moved
//! into a channel.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, OutputPin},
};
use soilguard_core::{time::MockTimeSource, AnalogInput, LineSink};

/// Converter error used by [`ProbeInput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionFailed;

/// Analog input reading a level the test controls
///
/// Queued samples are returned first, one per conversion; once the queue
/// is empty every conversion returns the level. A level of `None` makes
/// every conversion fail.
#[derive(Debug, Clone, Default)]
pub struct ProbeInput {
    level: Rc<Cell<Option<u16>>>,
    queue: Rc<RefCell<VecDeque<u16>>>,
    reads: Rc<Cell<usize>>,
}

impl ProbeInput {
    pub fn steady(raw: u16) -> Self {
        let probe = Self::default();
        probe.set(raw);
        probe
    }

    pub fn set(&self, raw: u16) {
        self.level.set(Some(raw));
    }

    pub fn fail(&self) {
        self.level.set(None);
    }

    /// Queue exact samples for the next conversions
    pub fn queue(&self, samples: &[u16]) {
        self.queue.borrow_mut().extend(samples.iter().copied());
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl AnalogInput for ProbeInput {
    type Error = ConversionFailed;

    fn read(&mut self) -> Result<u16, Self::Error> {
        self.reads.set(self.reads.get() + 1);

        if let Some(sample) = self.queue.borrow_mut().pop_front() {
            return Ok(sample);
        }
        self.level.get().ok_or(ConversionFailed)
    }
}

/// Output pin remembering every level it was driven to
#[derive(Debug, Clone, Default)]
pub struct RecordingPin {
    levels: Rc<RefCell<Vec<bool>>>,
}

impl RecordingPin {
    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }

    pub fn is_high(&self) -> bool {
        self.levels.borrow().last().copied().unwrap_or(false)
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

/// Delay that advances a mock clock instead of sleeping
#[derive(Debug)]
pub struct ClockDelay<'a> {
    clock: &'a MockTimeSource,
    total_ms: u64,
}

impl<'a> ClockDelay<'a> {
    pub fn new(clock: &'a MockTimeSource) -> Self {
        Self { clock, total_ms: 0 }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }
}

impl DelayNs for ClockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
        self.clock.advance(ms);
    }
}

/// In-memory stream
#[derive(Debug, Default)]
pub struct VecSink {
    pub lines: Vec<String>,
    /// `is_ready` polls that answer "not ready" before the stream attaches
    pub not_ready_polls: Cell<u32>,
    /// Never attaches
    pub detached: bool,
}

impl VecSink {
    pub fn ready() -> Self {
        Self::default()
    }

    pub fn attaching_after(polls: u32) -> Self {
        Self {
            not_ready_polls: Cell::new(polls),
            ..Self::default()
        }
    }

    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    pub fn data_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(|line| {
                line.starts_with(|c: char| c.is_ascii_digit()) || line.starts_with("DATA,")
            })
            .collect()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.lines.iter().filter(|line| line.starts_with(prefix)).count()
    }
}

impl LineSink for VecSink {
    type Error = Infallible;

    fn is_ready(&self) -> bool {
        if self.detached {
            return false;
        }
        let remaining = self.not_ready_polls.get();
        if remaining > 0 {
            self.not_ready_polls.set(remaining - 1);
            return false;
        }
        true
    }

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.lines.push(line.to_owned());
        Ok(())
    }
}
