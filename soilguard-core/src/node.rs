//! Node Loop
//!
//! ## Overview
//!
//! [`Node`] ties the components into the program a board runs:
//!
//! ```text
//!  start():  wait for stream (bounded) ─▶ banner ─▶ scheduler reset
//!
//!  poll():   scheduler due? ──no──▶ WouldBlock
//!                 │yes
//!                 ▼
//!            for each channel: acquire ─▶ diagnostics to stream
//!                 │
//!                 ▼
//!            data line to stream ─▶ CycleReport
//! ```
//!
//! Channels are processed in the order they were added, which only affects
//! the order of diagnostic lines. All channels share one analog input type
//! and one power pin type; boards with mixed wiring use
//! [`PowerController::always_on`](crate::power::PowerController::always_on)
//! for the unswitched probes.
//!
//! ## Blocking
//!
//! A cycle blocks for the stabilization and inter-sample delays of every
//! channel. With the defaults that is about 140 ms per switched channel
//! against a 5 s interval. `poll` itself never blocks between cycles.

use core::{
    convert::Infallible,
    fmt::{self, Write},
};

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use heapless::Vec;

use crate::{
    channel::{Channel, ChannelState},
    constants::{
        report::{MAX_CHANNELS, MAX_LINE_LEN},
        time::{
            MAX_STARTUP_GUARD_TIMEOUT_MS, REPORT_INTERVAL_MS, STARTUP_GUARD_TIMEOUT_MS,
            STARTUP_POLL_INTERVAL_MS,
        },
    },
    errors::{ConfigError, ConfigResult, StartupError},
    pipeline::{Acquisition, ChannelOutcome},
    report::{MissingPolicy, ReportEmitter, ReportFormat, ReportLine},
    scheduler::CycleScheduler,
    time::Timestamp,
    traits::{AnalogInput, LineSink, TimeSource},
    VERSION,
};

/// Node-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeConfig {
    /// Milliseconds between cycles
    pub report_interval_ms: u32,
    /// Longest wait for the stream at startup
    pub startup_timeout_ms: u32,
    /// Data line layout
    pub format: ReportFormat,
    /// What to report for channels with no usable reading
    pub missing: MissingPolicy,
    /// Whether to write the startup banner
    pub banner: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            report_interval_ms: REPORT_INTERVAL_MS,
            startup_timeout_ms: STARTUP_GUARD_TIMEOUT_MS,
            format: ReportFormat::default(),
            missing: MissingPolicy::default(),
            banner: true,
        }
    }
}

impl NodeConfig {
    /// Check the interval and the startup guard
    pub fn validate(&self) -> ConfigResult<()> {
        if self.report_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.startup_timeout_ms > MAX_STARTUP_GUARD_TIMEOUT_MS {
            return Err(ConfigError::StartupTimeoutTooLong {
                timeout_ms: self.startup_timeout_ms,
                max_ms: MAX_STARTUP_GUARD_TIMEOUT_MS,
            });
        }
        Ok(())
    }
}

/// Everything one cycle produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Time the cycle fired
    pub timestamp: Timestamp,
    /// Per-channel results in channel order
    pub outcomes: Vec<ChannelOutcome, MAX_CHANNELS>,
    /// Data line handed to the sink, if one was produced
    pub line: Option<ReportLine>,
}

impl CycleReport {
    /// Acquisitions in channel order
    pub fn acquisitions(&self) -> impl Iterator<Item = &Acquisition> + '_ {
        self.outcomes.iter().map(|o| &o.acquisition)
    }

    /// Whether every channel measured successfully
    pub fn all_valid(&self) -> bool {
        self.acquisitions().all(Acquisition::is_valid)
    }
}

#[derive(Debug)]
struct Slot<A, P> {
    channel: Channel<A, P>,
    state: ChannelState,
}

/// A complete sensor node
#[derive(Debug)]
pub struct Node<A, P, D, C, S> {
    config: NodeConfig,
    slots: Vec<Slot<A, P>, MAX_CHANNELS>,
    scheduler: CycleScheduler,
    emitter: ReportEmitter,
    delay: D,
    clock: C,
    sink: S,
}

impl<A, P, D, C, S> Node<A, P, D, C, S>
where
    A: AnalogInput,
    P: OutputPin,
    D: DelayNs,
    C: TimeSource,
    S: LineSink,
{
    /// Node with no channels; the first cycle is due one interval from now
    pub fn new(config: NodeConfig, delay: D, clock: C, sink: S) -> ConfigResult<Self> {
        config.validate()?;
        let scheduler = CycleScheduler::starting_at(config.report_interval_ms, clock.now())?;

        Ok(Self {
            emitter: ReportEmitter::new(config.format, config.missing),
            config,
            slots: Vec::new(),
            scheduler,
            delay,
            clock,
            sink,
        })
    }

    /// Add a probe; reported after the channels already added
    pub fn add_channel(&mut self, channel: Channel<A, P>) -> ConfigResult<()> {
        let state = channel.new_state()?;
        self.slots
            .push(Slot { channel, state })
            .map_err(|_| ConfigError::TooManyChannels { max: MAX_CHANNELS })
    }

    /// One-time startup: bounded wait for the stream, then the banner
    ///
    /// The banner is written and the scheduler restarted even when the wait
    /// times out; the error only tells the caller nobody was listening.
    pub fn start(&mut self) -> Result<(), StartupError> {
        let mut waited_ms = 0;
        let mut timed_out = false;

        while !self.sink.is_ready() {
            if waited_ms >= self.config.startup_timeout_ms {
                timed_out = true;
                break;
            }
            self.delay.delay_ms(STARTUP_POLL_INTERVAL_MS);
            waited_ms = waited_ms.saturating_add(STARTUP_POLL_INTERVAL_MS);
        }

        if timed_out {
            log_warn!("stream not ready after {} ms, starting anyway", waited_ms);
        } else {
            log_info!("stream ready after {} ms", waited_ms);
        }

        if self.config.banner {
            self.write_banner();
        }

        self.scheduler.reset(self.clock.now());

        if timed_out {
            Err(StartupError::TransportTimeout { waited_ms })
        } else {
            Ok(())
        }
    }

    fn write_banner(&mut self) {
        emit(
            &mut self.sink,
            format_args!("Soil Moisture Monitor starting (v{})", VERSION),
        );

        for slot in &self.slots {
            let channel = &slot.channel;
            let config = channel.config();
            let calibration = config.calibration;

            // Channel::new keeps the controller in step with power_pin
            match config.power_pin {
                Some(power_pin) => emit(
                    &mut self.sink,
                    format_args!(
                        "Sensor A{}: power pin D{}, dry {}, wet {}, {} samples",
                        config.pin,
                        power_pin,
                        calibration.dry(),
                        calibration.wet(),
                        config.samples
                    ),
                ),
                None => emit(
                    &mut self.sink,
                    format_args!(
                        "Sensor A{}: always on, dry {}, wet {}, {} samples",
                        config.pin,
                        calibration.dry(),
                        calibration.wet(),
                        config.samples
                    ),
                ),
            }
        }

        emit(
            &mut self.sink,
            format_args!("Report interval: {} ms", self.config.report_interval_ms),
        );
    }

    /// Run a cycle if one is due, otherwise `WouldBlock`
    pub fn poll(&mut self) -> nb::Result<CycleReport, Infallible> {
        let now = self.clock.now();
        self.scheduler.poll(now)?;
        Ok(self.run_cycle(now))
    }

    /// Run one cycle now, regardless of the schedule
    ///
    /// Every reading of the cycle is stamped with `now`, the same time the
    /// data line carries.
    pub fn run_cycle(&mut self, now: Timestamp) -> CycleReport {
        log_debug!("cycle at {} ms", now);

        let mut outcomes: Vec<ChannelOutcome, MAX_CHANNELS> = Vec::new();
        let mut acquisitions: Vec<Acquisition, MAX_CHANNELS> = Vec::new();

        for slot in self.slots.iter_mut() {
            let outcome = slot
                .channel
                .acquire(&mut slot.state, &mut self.delay, now);

            for diagnostic in &outcome.diagnostics {
                emit(&mut self.sink, format_args!("{}", diagnostic));
            }

            // Both have MAX_CHANNELS capacity, same as slots
            let _ = acquisitions.push(outcome.acquisition);
            let _ = outcomes.push(outcome);
        }

        let line = self.emitter.format_line(now, &acquisitions);
        if let Some(line) = &line {
            write_line(&mut self.sink, line.as_str());
        }

        CycleReport {
            timestamp: now,
            outcomes,
            line,
        }
    }

    /// Block until the next cycle is due, then run it
    ///
    /// Idles through the delay provider, so a simulated delay that advances
    /// a simulated clock drives the loop without real sleeping.
    pub fn wait_cycle(&mut self) -> CycleReport {
        loop {
            match self.poll() {
                Ok(report) => return report,
                Err(nb::Error::WouldBlock) => {
                    let remaining = self.scheduler.remaining_ms(self.clock.now());
                    self.delay.delay_ms(remaining.max(1));
                }
                Err(nb::Error::Other(never)) => match never {},
            }
        }
    }

    /// Run cycles forever
    pub fn run(&mut self) -> ! {
        loop {
            self.wait_cycle();
        }
    }

    /// Node settings
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Number of channels added
    pub fn channel_count(&self) -> usize {
        self.slots.len()
    }

    /// Channel at `index`, in the order added
    pub fn channel(&self, index: usize) -> Option<&Channel<A, P>> {
        self.slots.get(index).map(|slot| &slot.channel)
    }

    /// State of the channel at `index`
    pub fn state(&self, index: usize) -> Option<&ChannelState> {
        self.slots.get(index).map(|slot| &slot.state)
    }

    /// Cycle timing
    pub fn scheduler(&self) -> &CycleScheduler {
        &self.scheduler
    }

    /// Output stream
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Clock
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

// Sink failures never reach the pipeline
fn write_line<S: LineSink>(sink: &mut S, line: &str) {
    if let Err(_e) = sink.write_line(line) {
        log_warn!("stream write failed: {:?}", _e);
    }
}

fn emit<S: LineSink>(sink: &mut S, args: fmt::Arguments<'_>) {
    let mut line: heapless::String<MAX_LINE_LEN> = heapless::String::new();
    if line.write_fmt(args).is_err() {
        log_warn!("line exceeds {} bytes, dropped", MAX_LINE_LEN);
        return;
    }
    write_line(sink, line.as_str());
}
