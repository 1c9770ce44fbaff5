//! Probe Power Switching
//!
//! Keeping DC across a resistive probe electrolyses the electrodes within
//! weeks. Switched probes are powered from a GPIO only for the duration of
//! a measurement, which also saves most of the probe's draw on battery.
//!
//! After switching on, the divider needs time to charge the probe's
//! capacitance in wet soil before conversions are meaningful, so
//! [`PowerController::energize`] blocks for the stabilization delay.
//! Switching off is immediate.
//!
//! Probes wired straight to the supply use [`PowerController::always_on`],
//! for which both operations are no-ops.

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, OutputPin},
};

use crate::constants::time::POWER_STABILIZATION_MS;

/// Placeholder pin type for channels that are never switched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerPin;

impl ErrorType for NoPowerPin {
    type Error = Infallible;
}

impl OutputPin for NoPowerPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Switches one probe's supply around each measurement
#[derive(Debug)]
pub struct PowerController<P> {
    pin: Option<P>,
    settle_ms: u32,
}

impl<P: OutputPin> PowerController<P> {
    /// Probe powered through `pin`; drives it low immediately
    pub fn switched(mut pin: P, settle_ms: u32) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self {
            pin: Some(pin),
            settle_ms,
        })
    }

    /// Probe powered through `pin` with the default stabilization delay
    pub fn switched_default(pin: P) -> Result<Self, P::Error> {
        Self::switched(pin, POWER_STABILIZATION_MS)
    }

    /// Probe wired to the supply permanently
    pub const fn always_on() -> Self {
        Self {
            pin: None,
            settle_ms: 0,
        }
    }

    /// Replace the stabilization delay. Always-on probes ignore it.
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        if self.pin.is_some() {
            self.settle_ms = settle_ms;
        }
        self
    }

    /// Whether this probe has a power pin
    pub fn is_switched(&self) -> bool {
        self.pin.is_some()
    }

    /// Stabilization delay applied after power-up
    pub fn settle_ms(&self) -> u32 {
        self.settle_ms
    }

    /// Power the probe and wait for it to settle
    pub fn energize<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), P::Error> {
        if let Some(pin) = self.pin.as_mut() {
            pin.set_high()?;
            delay.delay_ms(self.settle_ms);
        }
        Ok(())
    }

    /// Cut probe power, no delay
    pub fn deenergize(&mut self) -> Result<(), P::Error> {
        if let Some(pin) = self.pin.as_mut() {
            pin.set_low()?;
        }
        Ok(())
    }

    /// Release the pin, leaving it in its current state
    pub fn release(self) -> Option<P> {
        self.pin
    }
}
