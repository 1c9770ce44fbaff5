//! Per-Channel Acquisition Pipeline
//!
//! ## Overview
//!
//! One call to [`Channel::acquire`] runs a complete measurement for one probe
//! and hands back an immutable [`Acquisition`]:
//!
//! ```text
//! energize ─▶ validation sample ─▶ rail check ─┬─ ok ─▶ N samples ─▶ median ─▶ rail check ─┐
//!                                              │                                           │
//!                                              │        Fresh ◀─ rolling avg ◀───── ok ────┤
//!                                              │                                           │
//!                                              └─ fault ◀───────────────────── fault ──────┘
//!                                                   ├─ last good? ─▶ Fallback
//!                                                   └─ none ───────▶ Unavailable
//! deenergize
//! ```
//!
//! The validation sample is a single conversion taken straight after power
//! settles. A rail code there means the probe is open or shorted and the
//! burst is skipped entirely; no filtering of a dead probe is attempted.
//!
//! The median is rail-checked again before it is accepted. A sensor that
//! drops out partway through the burst leaves most of its samples on a
//! rail, and that median must not reach the rolling window or the
//! last-good cache.
//!
//! Every reading carries the timestamp the caller passes in, which for the
//! node is the cycle's scheduled fire time. All channels of one cycle
//! therefore share the timestamp written on the data line.
//!
//! ## State
//!
//! Everything that survives between cycles lives in the caller's
//! [`ChannelState`]:
//!
//! - the rolling window, fed with the median of each good cycle
//! - `last_good_raw`, the median of the most recent good cycle
//! - the fault latch, which rate-limits the `ERROR:` diagnostic
//!
//! ## Failure Semantics
//!
//! Nothing here returns an error. Faults become `Fallback` or `Unavailable`
//! outcomes plus diagnostics, and the next scheduled cycle is the retry.
//! Power pin errors are logged; the rail check then decides whether the
//! probe produced anything usable.

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use heapless::Vec;

use crate::{
    channel::{Channel, ChannelState},
    constants::report::MAX_DIAGNOSTICS_PER_CYCLE,
    errors::SensorFault,
    events::Diagnostic,
    time::Timestamp,
    traits::AnalogInput,
};

/// One channel's measurement for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Cycle time in milliseconds since node start, wrapping. This is the
    /// time the cycle was scheduled, not the end of the burst.
    pub timestamp: Timestamp,
    /// Median of this cycle's burst, or the cached value on fallback
    pub raw_value: u16,
    /// Moisture in `[0, 100]`
    pub percentage: u8,
    /// Whether this cycle's own measurement passed the rail check
    pub valid: bool,
}

/// Outcome of one acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// Measured this cycle
    Fresh(Reading),
    /// Faulted, reporting the last good value (`valid == false`)
    Fallback {
        /// Reading built from the cached value
        reading: Reading,
        /// Why this cycle's measurement was rejected
        fault: SensorFault,
    },
    /// Faulted with nothing cached
    Unavailable {
        /// When the cycle ran
        timestamp: Timestamp,
        /// Why this cycle's measurement was rejected
        fault: SensorFault,
    },
}

impl Acquisition {
    /// Reading to report, if any
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            Acquisition::Fresh(reading) | Acquisition::Fallback { reading, .. } => Some(reading),
            Acquisition::Unavailable { .. } => None,
        }
    }

    /// Whether this cycle measured successfully
    pub fn is_valid(&self) -> bool {
        matches!(self, Acquisition::Fresh(_))
    }

    /// Fault that rejected this cycle's measurement
    pub fn fault(&self) -> Option<SensorFault> {
        match self {
            Acquisition::Fresh(_) => None,
            Acquisition::Fallback { fault, .. } | Acquisition::Unavailable { fault, .. } => {
                Some(*fault)
            }
        }
    }

    /// When the cycle ran
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Acquisition::Fresh(reading) | Acquisition::Fallback { reading, .. } => {
                reading.timestamp
            }
            Acquisition::Unavailable { timestamp, .. } => *timestamp,
        }
    }
}

/// Acquisition plus the diagnostics it raised, in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOutcome {
    /// Channel input number
    pub pin: u8,
    /// What was measured
    pub acquisition: Acquisition,
    /// Lines to write before the data line
    pub diagnostics: Vec<Diagnostic, MAX_DIAGNOSTICS_PER_CYCLE>,
}

impl<A, P> Channel<A, P>
where
    A: AnalogInput,
    P: OutputPin,
{
    /// Run one full measurement cycle for this channel
    ///
    /// Blocks for the stabilization delay (switched probes only) plus the
    /// inter-sample delays of the burst. `timestamp` is stamped on the
    /// outcome as given.
    pub fn acquire<D: DelayNs>(
        &mut self,
        state: &mut ChannelState,
        delay: &mut D,
        timestamp: Timestamp,
    ) -> ChannelOutcome {
        let pin = self.config.pin;
        let mut diagnostics = Vec::new();

        if let Err(_e) = self.power.energize(delay) {
            log_warn!("A{}: power on failed: {:?}", pin, _e);
        }

        let measured = self
            .detector
            .check(self.input.read())
            .and_then(|_| self.filter.sample(&mut self.input, delay))
            .and_then(|median| self.detector.classify(median).map(|()| median));

        if let Err(_e) = self.power.deenergize() {
            log_warn!("A{}: power off failed: {:?}", pin, _e);
        }

        let acquisition = match measured {
            Ok(median) => {
                let average = state.averager.feed(median);
                state.last_good_raw = Some(median);

                if state.fault.clear() {
                    log_info!("A{}: recovered, raw {}", pin, median);
                    push(&mut diagnostics, Diagnostic::Recovered { pin });
                }

                Acquisition::Fresh(Reading {
                    timestamp,
                    raw_value: median,
                    percentage: self.config.calibration.to_percentage(average),
                    valid: true,
                })
            }
            Err(fault) => {
                if state.fault.raise() {
                    log_warn!("A{}: {}", pin, fault);
                    push(&mut diagnostics, Diagnostic::SensorFault { pin });
                }

                match state.last_good_raw {
                    Some(raw) => {
                        log_warn!("A{}: reporting last good {}", pin, raw);
                        push(&mut diagnostics, Diagnostic::UsingLastGood { pin, raw });
                        Acquisition::Fallback {
                            reading: Reading {
                                timestamp,
                                raw_value: raw,
                                percentage: self.config.calibration.to_percentage(raw),
                                valid: false,
                            },
                            fault,
                        }
                    }
                    None => {
                        push(&mut diagnostics, Diagnostic::NoUsableReading { pin });
                        Acquisition::Unavailable { timestamp, fault }
                    }
                }
            }
        };

        ChannelOutcome {
            pin,
            acquisition,
            diagnostics,
        }
    }
}

// At most two diagnostics per cycle, well inside capacity
fn push(diagnostics: &mut Vec<Diagnostic, MAX_DIAGNOSTICS_PER_CYCLE>, diagnostic: Diagnostic) {
    let _ = diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::WarmupMode,
        calibration::Calibration,
        channel::ChannelConfig,
        power::{NoPowerPin, PowerController},
    };
    use core::convert::Infallible;

    struct Constant(u16);

    impl AnalogInput for Constant {
        type Error = Infallible;

        fn read(&mut self) -> Result<u16, Self::Error> {
            Ok(self.0)
        }
    }

    /// Plays back a fixed list of codes, then repeats the last one
    struct Script {
        codes: &'static [u16],
        next: usize,
    }

    impl AnalogInput for Script {
        type Error = Infallible;

        fn read(&mut self) -> Result<u16, Self::Error> {
            let code = self.codes[self.next.min(self.codes.len() - 1)];
            self.next += 1;
            Ok(code)
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn config() -> ChannelConfig {
        ChannelConfig::new(0)
            .with_calibration(Calibration::new(1023, 300).unwrap())
            .with_warmup(WarmupMode::FilledOnly)
    }

    fn channel(raw: u16) -> (Channel<Constant, NoPowerPin>, ChannelState) {
        let channel = Channel::new(config(), Constant(raw), PowerController::always_on()).unwrap();
        let state = channel.new_state().unwrap();
        (channel, state)
    }

    #[test]
    fn steady_reading() {
        let (mut channel, mut state) = channel(600);

        let outcome = channel.acquire(&mut state, &mut NoDelay, 5000);

        assert_eq!(
            outcome.acquisition,
            Acquisition::Fresh(Reading {
                timestamp: 5000,
                raw_value: 600,
                percentage: 58,
                valid: true,
            })
        );
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(state.last_good_raw(), Some(600));
    }

    #[test]
    fn never_wired_is_unavailable() {
        let (mut channel, mut state) = channel(1023);

        let first = channel.acquire(&mut state, &mut NoDelay, 0);
        assert_eq!(
            first.acquisition,
            Acquisition::Unavailable {
                timestamp: 0,
                fault: SensorFault::RailHigh { raw: 1023 },
            }
        );
        assert_eq!(
            first.diagnostics.as_slice(),
            &[
                Diagnostic::SensorFault { pin: 0 },
                Diagnostic::NoUsableReading { pin: 0 }
            ]
        );

        let second = channel.acquire(&mut state, &mut NoDelay, 5000);
        assert!(!second.acquisition.is_valid());
        assert_eq!(
            second.diagnostics.as_slice(),
            &[Diagnostic::NoUsableReading { pin: 0 }]
        );
        assert_eq!(state.last_good_raw(), None);
        assert!(state.sticky_error());
    }

    #[test]
    fn fallback_uses_cached_median() {
        let (mut channel, mut state) = channel(700);

        channel.acquire(&mut state, &mut NoDelay, 0);
        channel.input.0 = 0;

        let outcome = channel.acquire(&mut state, &mut NoDelay, 5000);
        let reading = outcome.acquisition.reading().copied().unwrap();

        assert_eq!(reading.raw_value, 700);
        assert_eq!(reading.percentage, Calibration::default().to_percentage(700));
        assert!(!reading.valid);
        assert_eq!(reading.timestamp, 5000);
        assert_eq!(
            outcome.acquisition.fault(),
            Some(SensorFault::RailLow { raw: 0 })
        );
    }

    #[test]
    fn fault_does_not_touch_window() {
        let (mut channel, mut state) = channel(600);

        channel.acquire(&mut state, &mut NoDelay, 0);
        channel.input.0 = 1023;
        channel.acquire(&mut state, &mut NoDelay, 5000);

        assert_eq!(state.averager().window().filled(), 1);
        assert_eq!(state.averager().window().sum(), 600);
    }

    #[test]
    fn railed_median_is_rejected() {
        let mut channel = Channel::new(
            config(),
            Script {
                codes: &[600, 600, 600, 600, 600, 600],
                next: 0,
            },
            PowerController::<NoPowerPin>::always_on(),
        )
        .unwrap();
        let mut state = channel.new_state().unwrap();
        channel.acquire(&mut state, &mut NoDelay, 0);

        // validation sample passes, then the probe drops out mid-burst
        channel.input = Script {
            codes: &[600, 600, 1023, 1023, 600, 1023],
            next: 0,
        };
        let outcome = channel.acquire(&mut state, &mut NoDelay, 5000);

        assert_eq!(
            outcome.acquisition.fault(),
            Some(SensorFault::RailHigh { raw: 1023 })
        );
        assert_eq!(outcome.acquisition.reading().unwrap().raw_value, 600);
        assert_eq!(
            outcome.diagnostics.as_slice(),
            &[
                Diagnostic::SensorFault { pin: 0 },
                Diagnostic::UsingLastGood { pin: 0, raw: 600 }
            ]
        );
        assert_eq!(state.last_good_raw(), Some(600));
        assert_eq!(state.averager().window().filled(), 1);
        assert_eq!(state.averager().window().sum(), 600);
        assert!(state.sticky_error());
    }

    #[test]
    fn recovery_is_reported_once() {
        let (mut channel, mut state) = channel(1023);

        channel.acquire(&mut state, &mut NoDelay, 0);
        channel.input.0 = 600;

        let recovered = channel.acquire(&mut state, &mut NoDelay, 5000);
        assert_eq!(
            recovered.diagnostics.as_slice(),
            &[Diagnostic::Recovered { pin: 0 }]
        );

        let steady = channel.acquire(&mut state, &mut NoDelay, 10000);
        assert!(steady.diagnostics.is_empty());
    }
}
