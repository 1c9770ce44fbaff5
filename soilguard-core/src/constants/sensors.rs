//! Probe and Converter Ranges
//!
//! Values for the resistive two-prong probes this node was built around,
//! read through the on-chip successive-approximation ADC.

// ===== CONVERTER RANGES =====

/// Largest code of a 10-bit converter (AVR-class boards).
pub const ADC_10BIT_MAX: u16 = 1023;

/// Largest code of a 12-bit converter (ESP32, RP2040, STM32).
pub const ADC_12BIT_MAX: u16 = 4095;

// ===== CALIBRATION =====

/// Raw code with the probe in dry air.
///
/// A resistive probe in air is an open circuit, so the divider sits at the
/// top of the range. Probes read higher the drier the soil.
///
/// Source: bench measurement with the reference probe on a 10-bit converter
pub const DEFAULT_DRY_RAW: u16 = 1023;

/// Raw code with the probe submerged in tap water.
///
/// Source: bench measurement with the reference probe on a 10-bit converter
pub const DEFAULT_WET_RAW: u16 = 300;

// ===== SAMPLING =====

/// Raw samples taken per cycle and fed to the median filter.
///
/// Odd so the median is a single sample. Five rejects up to two spikes.
/// The rolling average window uses the same length.
pub const DEFAULT_SAMPLES_PER_CYCLE: usize = 5;

/// Upper bound on samples per cycle.
///
/// Sizes the fixed storage of the median scratch buffer and the rolling
/// window, so it directly costs RAM per channel.
pub const MAX_SAMPLES_PER_CYCLE: usize = 15;
