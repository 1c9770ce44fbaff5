//! Simulated resistive probes
//!
//! A probe reads `base_raw`, drifting drier over time, with uniform noise
//! and occasional contact spikes that the median filter should reject. A
//! disconnect window makes it read the upper rail (open circuit), which the
//! node must detect and ride out on its cached value.
//!
//! Switched probes read the lower rail while unpowered, like the real
//! divider with its top leg floating.

use std::{cell::Cell, convert::Infallible, rc::Rc};

use embedded_hal::digital::{ErrorType, OutputPin};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use soilguard_core::{AnalogInput, TimeSource, Timestamp};

use crate::hal::SimClock;

/// Interval during which the probe is unplugged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub from_ms: Timestamp,
    pub until_ms: Timestamp,
}

impl Window {
    pub fn contains(&self, now: Timestamp) -> bool {
        now >= self.from_ms && now < self.until_ms
    }
}

/// How a simulated probe behaves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeModel {
    /// Reading at time zero
    pub base_raw: u16,
    /// Raw counts added per simulated minute (soil drying out)
    pub drift_per_min: i32,
    /// Uniform noise amplitude in raw counts
    pub noise: u16,
    /// Probability that a single conversion is a contact spike
    pub spike_chance: f64,
    /// Open-circuit interval, if any
    pub disconnect: Option<Window>,
    /// Noise seed, for reproducible runs
    pub seed: u64,
}

impl Default for ProbeModel {
    fn default() -> Self {
        Self {
            base_raw: 600,
            drift_per_min: 0,
            noise: 3,
            spike_chance: 0.0,
            disconnect: None,
            seed: 1,
        }
    }
}

/// Analog input driven by a [`ProbeModel`]
#[derive(Debug)]
pub struct SimProbe {
    model: ProbeModel,
    clock: SimClock,
    powered: Rc<Cell<bool>>,
    rng: StdRng,
    max_code: u16,
}

impl SimProbe {
    /// A probe and the pin that powers it
    ///
    /// Starts unpowered; always-on probes call [`SimProbe::power_on`] once.
    pub fn new(model: ProbeModel, clock: SimClock, max_code: u16) -> (Self, SimPin) {
        let powered = Rc::new(Cell::new(false));
        let pin = SimPin {
            powered: Rc::clone(&powered),
        };
        let probe = Self {
            rng: StdRng::seed_from_u64(model.seed),
            model,
            clock,
            powered,
            max_code,
        };
        (probe, pin)
    }

    pub fn power_on(&self) {
        self.powered.set(true);
    }

    fn level(&mut self, now: Timestamp) -> u16 {
        let minutes = i64::from(now / 60_000);
        let drifted =
            i64::from(self.model.base_raw) + minutes * i64::from(self.model.drift_per_min);

        let noise = i64::from(self.model.noise);
        let mut value = drifted + self.rng.gen_range(-noise..=noise);

        if self.model.spike_chance > 0.0 && self.rng.gen_bool(self.model.spike_chance.min(1.0)) {
            value += self.rng.gen_range(150..=300);
        }

        // Keep healthy readings off the rails
        value.clamp(1, i64::from(self.max_code) - 1) as u16
    }
}

impl AnalogInput for SimProbe {
    type Error = Infallible;

    fn read(&mut self) -> Result<u16, Self::Error> {
        if !self.powered.get() {
            return Ok(0);
        }

        let now = self.clock.now();
        if self.model.disconnect.is_some_and(|w| w.contains(now)) {
            return Ok(self.max_code);
        }

        Ok(self.level(now))
    }
}

/// Power pin feeding a [`SimProbe`]
#[derive(Debug, Clone)]
pub struct SimPin {
    powered: Rc<Cell<bool>>,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        log::trace!("probe power off");
        self.powered.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        log::trace!("probe power on");
        self.powered.set(true);
        Ok(())
    }
}
