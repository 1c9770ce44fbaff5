//! Error Types for Acquisition and Configuration
//!
//! ## Design Philosophy
//!
//! Errors follow the same rules as the rest of the crate:
//!
//! 1. **Small Size**: every variant carries at most two integers, so errors
//!    can be copied into per-cycle results without allocation.
//!
//! 2. **No Heap Allocation**: no `String`, no boxed sources.
//!
//! 3. **Copy Semantics**: all error types are `Copy` and can be stored in the
//!    `Acquisition` value handed back from a cycle.
//!
//! ## Error Categories
//!
//! ### Sensor Faults (recovered locally)
//! - `SensorFault::RailLow` / `RailHigh`: the validation sample sits on an
//!   electrical rail, which means an open or shorted probe rather than
//!   bone-dry or submerged soil.
//! - `SensorFault::AdcRead`: the converter itself reported an error.
//!
//! A fault never stops the node. The pipeline falls back to the cached
//! last-good value and the next scheduled cycle is the retry.
//!
//! ### Configuration Errors (rejected at construction)
//! - Sample counts that are zero, even, or larger than the window storage
//! - Calibration bounds that are not `dry > wet`
//! - More channels than the node has room for
//! - A power controller that disagrees with the channel's declared power pin
//! - A startup guard longer than the node is willing to block
//!
//! ### Startup
//! - `StartupError::TransportTimeout`: nobody attached to the stream within
//!   the startup guard. Logged, then the node runs anyway.

use thiserror_no_std::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a probe measurement was rejected for this cycle
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// Sample reads the lower rail (shorted probe or missing pull-up)
    #[error("raw value {raw} on lower rail")]
    RailLow {
        /// The rejected raw converter code
        raw: u16,
    },

    /// Sample reads the upper rail (open circuit, probe unplugged)
    #[error("raw value {raw} on upper rail")]
    RailHigh {
        /// The rejected raw converter code
        raw: u16,
    },

    /// The analog converter returned an error instead of a code
    #[error("analog conversion failed")]
    AdcRead,
}

/// Configuration rejected while building channels or the node
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A channel must take at least one sample per cycle
    #[error("sample count must be at least 1")]
    ZeroSamples,

    /// Median of an even count would need averaging two samples
    #[error("sample count {count} is even, median needs an odd count")]
    EvenSampleCount {
        /// The rejected sample count
        count: usize,
    },

    /// Sample count exceeds the fixed window storage
    #[error("sample count {count} exceeds maximum {max}")]
    SampleCountTooLarge {
        /// The rejected sample count
        count: usize,
        /// Largest supported sample count
        max: usize,
    },

    /// Calibration must satisfy `dry > wet` (wetter soil reads lower)
    #[error("calibration dry={dry} must be greater than wet={wet}")]
    InvertedCalibration {
        /// Raw code in dry air
        dry: u16,
        /// Raw code in water
        wet: u16,
    },

    /// Calibration bound does not fit the converter resolution
    #[error("calibration bound {value} exceeds converter maximum {max}")]
    CalibrationOutOfRange {
        /// The offending bound
        value: u16,
        /// Largest code the converter can produce
        max: u16,
    },

    /// Node already holds the maximum number of channels
    #[error("node supports at most {max} channels")]
    TooManyChannels {
        /// Channel capacity of the node
        max: usize,
    },

    /// A reporting interval of zero would fire on every poll
    #[error("report interval must be greater than zero")]
    ZeroInterval,

    /// Channel declares a power pin but was given an always-on controller
    #[error("channel A{pin} declares power pin D{power_pin} but has no switched controller")]
    MissingPowerPin {
        /// Analog input of the channel
        pin: u8,
        /// Declared power pin
        power_pin: u8,
    },

    /// Channel was given a switched controller but declares no power pin
    #[error("channel A{pin} has a switched controller but declares no power pin")]
    UndeclaredPowerPin {
        /// Analog input of the channel
        pin: u8,
    },

    /// Startup guard longer than the node will block before running
    #[error("startup timeout {timeout_ms} ms exceeds maximum {max_ms} ms")]
    StartupTimeoutTooLong {
        /// The rejected timeout
        timeout_ms: u32,
        /// Longest supported timeout
        max_ms: u32,
    },
}

/// Problems during the one-time startup sequence
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupError {
    /// The output stream never reported ready within the startup guard
    #[error("transport not ready after {waited_ms} ms")]
    TransportTimeout {
        /// How long the guard waited before giving up
        waited_ms: u32,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorFault {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::RailLow { raw } => defmt::write!(fmt, "raw {} on lower rail", raw),
            Self::RailHigh { raw } => defmt::write!(fmt, "raw {} on upper rail", raw),
            Self::AdcRead => defmt::write!(fmt, "ADC read failed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ZeroSamples => defmt::write!(fmt, "zero samples"),
            Self::EvenSampleCount { count } => defmt::write!(fmt, "even sample count {}", count),
            Self::SampleCountTooLarge { count, max } => {
                defmt::write!(fmt, "sample count {} > {}", count, max)
            }
            Self::InvertedCalibration { dry, wet } => {
                defmt::write!(fmt, "calibration dry {} <= wet {}", dry, wet)
            }
            Self::CalibrationOutOfRange { value, max } => {
                defmt::write!(fmt, "calibration {} > {}", value, max)
            }
            Self::TooManyChannels { max } => defmt::write!(fmt, "more than {} channels", max),
            Self::ZeroInterval => defmt::write!(fmt, "zero interval"),
            Self::MissingPowerPin { pin, power_pin } => {
                defmt::write!(fmt, "A{} power pin D{} not supplied", pin, power_pin)
            }
            Self::UndeclaredPowerPin { pin } => {
                defmt::write!(fmt, "A{} power pin not declared", pin)
            }
            Self::StartupTimeoutTooLong { timeout_ms, max_ms } => {
                defmt::write!(fmt, "startup timeout {} > {} ms", timeout_ms, max_ms)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StartupError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::TransportTimeout { waited_ms } => {
                defmt::write!(fmt, "transport timeout after {} ms", waited_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_stay_small() {
        assert!(core::mem::size_of::<SensorFault>() <= 4);
        assert!(core::mem::size_of::<ConfigError>() <= 24);
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            SensorFault::RailHigh { raw: 1023 }.to_string(),
            "raw value 1023 on upper rail"
        );
        assert_eq!(
            ConfigError::InvertedCalibration { dry: 300, wet: 1023 }.to_string(),
            "calibration dry=300 must be greater than wet=1023"
        );
    }
}
