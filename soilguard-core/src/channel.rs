//! Channels: one physical probe, its configuration and its state
//!
//! Configuration and state are kept apart. [`Channel`] owns the hardware
//! handles and the fixed parameters; [`ChannelState`] holds everything that
//! changes from cycle to cycle. The node owns one of each per probe and
//! passes the state into every acquisition by `&mut`, so there is no
//! hidden per-channel global anywhere.

use embedded_hal::digital::OutputPin;

use crate::{
    buffer::{RollingAverager, WarmupMode},
    calibration::Calibration,
    constants::{
        sensors::DEFAULT_SAMPLES_PER_CYCLE,
        time::{INTER_SAMPLE_DELAY_MS, POWER_STABILIZATION_MS},
    },
    errors::{ConfigError, ConfigResult},
    filter::{check_sample_count, SampleFilter},
    power::PowerController,
    validators::{AdcResolution, FaultDetector, FaultLatch},
};

/// Static description of one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChannelConfig {
    /// Analog input number, reported as `A<pin>`
    pub pin: u8,
    /// Digital pin switching probe power, `None` for always-on probes
    pub power_pin: Option<u8>,
    /// Dry/wet bounds for the percentage map
    pub calibration: Calibration,
    /// Samples per cycle for the median, also the rolling window length
    pub samples: usize,
    /// Converter width, fixes the fault rails
    pub resolution: AdcResolution,
    /// Rolling average behaviour before the window is full
    pub warmup: WarmupMode,
    /// Stabilization delay after power-up
    pub settle_ms: u32,
    /// Delay between raw samples
    pub sample_delay_ms: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ChannelConfig {
    /// Defaults for the probe on analog input `pin`
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            power_pin: None,
            calibration: Calibration::reference(),
            samples: DEFAULT_SAMPLES_PER_CYCLE,
            resolution: AdcResolution::Bits10,
            warmup: WarmupMode::FilledOnly,
            settle_ms: POWER_STABILIZATION_MS,
            sample_delay_ms: INTER_SAMPLE_DELAY_MS,
        }
    }

    /// Declare a switched probe on digital pin `power_pin`. The channel
    /// must then be built with a [`PowerController::switched`] controller.
    pub const fn with_power_pin(mut self, power_pin: u8) -> Self {
        self.power_pin = Some(power_pin);
        self
    }

    /// Set calibration bounds
    pub const fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set samples per cycle
    pub const fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set converter width
    pub const fn with_resolution(mut self, resolution: AdcResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set warm-up behaviour
    pub const fn with_warmup(mut self, warmup: WarmupMode) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the delays (stabilization, inter-sample)
    pub const fn with_delays(mut self, settle_ms: u32, sample_delay_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self.sample_delay_ms = sample_delay_ms;
        self
    }

    /// Check every constraint the pipeline relies on
    pub fn validate(&self) -> ConfigResult<()> {
        check_sample_count(self.samples)?;
        self.calibration.validate()?;

        let max = self.resolution.max_code();
        if self.calibration.dry() > max {
            return Err(ConfigError::CalibrationOutOfRange {
                value: self.calibration.dry(),
                max,
            });
        }
        Ok(())
    }
}

/// Per-channel mutable state, created once at startup
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub(crate) averager: RollingAverager,
    pub(crate) last_good_raw: Option<u16>,
    pub(crate) fault: FaultLatch,
}

impl ChannelState {
    /// Fresh state: zeroed window, no last-good value, latch clear
    pub fn new(config: &ChannelConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            averager: RollingAverager::new(config.samples, config.warmup)?,
            last_good_raw: None,
            fault: FaultLatch::new(),
        })
    }

    /// Most recent validated median, if any cycle ever succeeded
    pub fn last_good_raw(&self) -> Option<u16> {
        self.last_good_raw
    }

    /// Whether the channel is inside a fault run
    pub fn sticky_error(&self) -> bool {
        self.fault.is_active()
    }

    /// Rolling average state
    pub fn averager(&self) -> &RollingAverager {
        &self.averager
    }
}

/// One probe: its config plus the hardware it is wired to
#[derive(Debug)]
pub struct Channel<A, P> {
    pub(crate) config: ChannelConfig,
    pub(crate) input: A,
    pub(crate) power: PowerController<P>,
    pub(crate) filter: SampleFilter,
    pub(crate) detector: FaultDetector,
}

impl<A, P: OutputPin> Channel<A, P> {
    /// Bind a validated config to an analog input and power controller
    ///
    /// The controller must be switched exactly when `config.power_pin` is
    /// set. Its stabilization delay is replaced by `config.settle_ms`.
    pub fn new(
        config: ChannelConfig,
        input: A,
        power: PowerController<P>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        match (config.power_pin, power.is_switched()) {
            (Some(power_pin), false) => {
                return Err(ConfigError::MissingPowerPin {
                    pin: config.pin,
                    power_pin,
                })
            }
            (None, true) => return Err(ConfigError::UndeclaredPowerPin { pin: config.pin }),
            _ => {}
        }

        Ok(Self {
            filter: SampleFilter::new(config.samples, config.sample_delay_ms)?,
            detector: FaultDetector::new(config.resolution),
            power: power.with_settle_ms(config.settle_ms),
            config,
            input,
        })
    }

    /// Fixed parameters of this channel
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Analog input number
    pub fn pin(&self) -> u8 {
        self.config.pin
    }

    /// Fresh state sized for this channel
    pub fn new_state(&self) -> ConfigResult<ChannelState> {
        ChannelState::new(&self.config)
    }

    /// Analog input handle
    pub fn input(&self) -> &A {
        &self.input
    }

    /// Power controller
    pub fn power(&self) -> &PowerController<P> {
        &self.power
    }
}
