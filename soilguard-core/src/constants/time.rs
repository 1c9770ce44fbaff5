//! Time-Related Constants
//!
//! All durations are milliseconds, matching the wrapping `u32` millisecond
//! counter used as [`crate::time::Timestamp`].

/// Pause between raw samples within one cycle.
///
/// Lets the ADC sample-and-hold and the probe's RC front end settle between
/// conversions.
pub const INTER_SAMPLE_DELAY_MS: u32 = 10;

/// Pause after switching probe power on, before the first sample.
///
/// Covers capacitive settling of the probe in wet soil.
///
/// Source: scope capture of the divider output after power-up
pub const POWER_STABILIZATION_MS: u32 = 100;

/// Interval between reporting cycles.
pub const REPORT_INTERVAL_MS: u32 = 5000;

/// Longest the node waits for the output stream to attach at startup.
///
/// Without a bound a node with no collector attached would never start
/// measuring.
pub const STARTUP_GUARD_TIMEOUT_MS: u32 = 3000;

/// Largest accepted startup guard: ten minutes.
pub const MAX_STARTUP_GUARD_TIMEOUT_MS: u32 = 600_000;

/// Poll period of the startup guard while waiting for the stream.
pub const STARTUP_POLL_INTERVAL_MS: u32 = 10;
