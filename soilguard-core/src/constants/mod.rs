//! Constants for SoilGuard Core
//!
//! Compile-time defaults for every tunable in the node. Nothing here is
//! reloadable at runtime; the config structs in [`crate::channel`] and
//! [`crate::node`] take these as their defaults.
//!
//! ## Organization
//!
//! - **Sensors**: converter ranges and probe calibration
//! - **Time**: delays and intervals, all in milliseconds
//! - **Report**: output line sizing and channel capacity

/// Converter ranges, calibration defaults and per-cycle sample counts.
pub mod sensors;

/// Settling delays, reporting interval and startup guard, in milliseconds.
pub mod time;

/// Output line sizing, channel capacity and the missing-value sentinel.
pub mod report;

pub use sensors::{
    ADC_10BIT_MAX, ADC_12BIT_MAX, DEFAULT_DRY_RAW, DEFAULT_SAMPLES_PER_CYCLE, DEFAULT_WET_RAW,
    MAX_SAMPLES_PER_CYCLE,
};

pub use time::{
    INTER_SAMPLE_DELAY_MS, MAX_STARTUP_GUARD_TIMEOUT_MS, POWER_STABILIZATION_MS,
    REPORT_INTERVAL_MS, STARTUP_GUARD_TIMEOUT_MS, STARTUP_POLL_INTERVAL_MS,
};

pub use report::{MAX_CHANNELS, MAX_DIAGNOSTICS_PER_CYCLE, MAX_LINE_LEN, MISSING_VALUE_SENTINEL};
