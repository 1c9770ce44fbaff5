//! Median Filter for Within-Cycle Outlier Rejection
//!
//! ## Overview
//!
//! A resistive probe picks up contact noise and switching transients that
//! show up as single wild samples. Averaging would smear a spike into the
//! result. The median of an odd number of samples ignores it entirely: with
//! five samples, up to two can be arbitrarily wrong before the output moves.
//!
//! ```text
//! samples:  [612, 1023, 608, 0, 610]
//! sorted:   [0, 608, 610, 612, 1023]
//!                      ↑
//!                   median = 610
//! ```
//!
//! The filter only deals with noise within one cycle. Cycle-to-cycle
//! smoothing is the [`crate::buffer::RollingAverager`]'s job.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::{
    constants::sensors::MAX_SAMPLES_PER_CYCLE,
    errors::{ConfigError, ConfigResult, SensorFault},
    traits::AnalogInput,
};

/// Median of a sample set, or `None` when empty
///
/// Sorts in place and returns the element at `len / 2`. For odd lengths this
/// is the true median; for even lengths it is the upper of the two middle
/// values (no averaging, so the result is always one of the inputs).
pub fn median(samples: &mut [u16]) -> Option<u16> {
    if samples.is_empty() {
        return None;
    }

    samples.sort_unstable();
    Some(samples[samples.len() / 2])
}

/// Takes a burst of raw samples from one input and returns their median
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFilter {
    count: usize,
    delay_ms: u32,
}

impl SampleFilter {
    /// Create a filter taking `count` samples, `delay_ms` apart
    ///
    /// `count` must be odd and between 1 and [`MAX_SAMPLES_PER_CYCLE`].
    pub fn new(count: usize, delay_ms: u32) -> ConfigResult<Self> {
        check_sample_count(count)?;
        Ok(Self { count, delay_ms })
    }

    /// Samples taken per cycle
    pub fn count(&self) -> usize {
        self.count
    }

    /// Delay between consecutive samples in milliseconds
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Read `count` samples and return their median
    ///
    /// Blocks for `(count - 1) * delay_ms`. A converter error on any sample
    /// abandons the burst: a median over a partial set would silently change
    /// the filter's outlier tolerance.
    pub fn sample<A, D>(&self, input: &mut A, delay: &mut D) -> Result<u16, SensorFault>
    where
        A: AnalogInput,
        D: DelayNs,
    {
        let mut samples: Vec<u16, MAX_SAMPLES_PER_CYCLE> = Vec::new();

        for i in 0..self.count {
            if i > 0 {
                delay.delay_ms(self.delay_ms);
            }

            let raw = input.read().map_err(|_| SensorFault::AdcRead)?;
            // Capacity checked in new()
            if samples.push(raw).is_err() {
                break;
            }
        }

        median(&mut samples).ok_or(SensorFault::AdcRead)
    }
}

/// Shared validation for anything sized by the per-cycle sample count
pub(crate) fn check_sample_count(count: usize) -> ConfigResult<()> {
    if count == 0 {
        return Err(ConfigError::ZeroSamples);
    }
    if count % 2 == 0 {
        return Err(ConfigError::EvenSampleCount { count });
    }
    if count > MAX_SAMPLES_PER_CYCLE {
        return Err(ConfigError::SampleCountTooLarge {
            count,
            max: MAX_SAMPLES_PER_CYCLE,
        });
    }
    Ok(())
}
