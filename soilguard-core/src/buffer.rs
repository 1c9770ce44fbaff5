//! Fixed-Size Rolling Window for Cycle-to-Cycle Smoothing
//!
//! ## Overview
//!
//! Each cycle contributes one median-filtered sample per channel. The
//! window keeps the last `size` of them in a circular buffer together with
//! their running sum, so the moving average costs one subtraction, one
//! addition and one division per cycle regardless of window length.
//!
//! ## Invariants
//!
//! - `sum == Σ data[..size]` after every push
//! - `write_pos < size`
//! - `filled <= size`
//!
//! Storage is a fixed `[u16; CAP]` chosen at compile time; the active window
//! length `size <= CAP` comes from the channel configuration. Unwritten slots
//! are zero, so a zero-filled average is biased low until the window has
//! been written `size` times. [`WarmupMode`] picks whether to keep that bias.
//!
//! ## Memory Layout
//!
//! ```text
//! SampleWindow<15> with size = 5, after 7 pushes (a..g):
//! ┌───┬───┬───┬───┬───┬───┬─ ─ ─┐
//! │ f │ g │ c │ d │ e │ 0 │ ... │  ← slots >= size are never touched
//! └───┴───┴───┴───┴───┴───┴─ ─ ─┘
//!           ↑
//!           └── write_pos = 2 (next overwrite: c, the oldest)
//! ```

use crate::{
    constants::sensors::MAX_SAMPLES_PER_CYCLE,
    errors::{ConfigError, ConfigResult},
};

/// How the average behaves before the window has been filled once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WarmupMode {
    /// Always divide by the window length; empty slots count as zero
    ZeroFilled,
    /// Divide by the number of slots written so far until the window is full
    #[default]
    FilledOnly,
}

/// Circular buffer of per-cycle samples with a running sum
#[derive(Debug, Clone)]
pub struct SampleWindow<const CAP: usize> {
    data: [u16; CAP],
    size: usize,
    write_pos: usize,
    filled: usize,
    sum: u32,
}

impl<const CAP: usize> SampleWindow<CAP> {
    /// Create a zero-filled window of `size` slots
    pub fn new(size: usize) -> ConfigResult<Self> {
        if size == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if size > CAP {
            return Err(ConfigError::SampleCountTooLarge { count: size, max: CAP });
        }

        Ok(Self {
            data: [0; CAP],
            size,
            write_pos: 0,
            filled: 0,
            sum: 0,
        })
    }

    /// Overwrite the oldest slot with `sample`
    ///
    /// Subtracts the outgoing value before adding the new one so the sum
    /// never needs recomputing.
    pub fn push(&mut self, sample: u16) {
        let outgoing = self.data[self.write_pos];
        self.sum = self.sum - u32::from(outgoing) + u32::from(sample);
        self.data[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.size;

        if self.filled < self.size {
            self.filled += 1;
        }
    }

    /// Integer mean of the window under the given warm-up rule
    ///
    /// Truncates toward zero. Returns 0 for a window never written in
    /// `FilledOnly` mode.
    pub fn average(&self, mode: WarmupMode) -> u16 {
        let divisor = match mode {
            WarmupMode::ZeroFilled => self.size,
            WarmupMode::FilledOnly => self.filled,
        };

        if divisor == 0 {
            return 0;
        }

        // Mean of u16 values always fits in u16
        (self.sum / divisor as u32) as u16
    }

    /// Running sum of all slots
    pub fn sum(&self) -> u32 {
        self.sum
    }

    /// Window length
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether nothing has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Slots written since creation, saturating at the window length
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Whether every slot has been written at least once
    pub fn is_full(&self) -> bool {
        self.filled == self.size
    }

    /// Most recently pushed sample
    pub fn last(&self) -> Option<u16> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 {
            self.size - 1
        } else {
            self.write_pos - 1
        };

        Some(self.data[idx])
    }

    /// Iterate over written samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        // Before the first wrap the oldest sample is at 0, afterwards at write_pos
        let start = if self.is_full() { self.write_pos } else { 0 };
        (0..self.filled).map(move |i| self.data[(start + i) % self.size])
    }
}

/// Window type used by channel state
pub type ChannelWindow = SampleWindow<MAX_SAMPLES_PER_CYCLE>;

/// Moving average over the last `size` cycles of one channel
#[derive(Debug, Clone)]
pub struct RollingAverager {
    window: ChannelWindow,
    mode: WarmupMode,
}

impl RollingAverager {
    /// Create an averager over `size` cycles
    pub fn new(size: usize, mode: WarmupMode) -> ConfigResult<Self> {
        Ok(Self {
            window: SampleWindow::new(size)?,
            mode,
        })
    }

    /// Push this cycle's filtered sample and return the new average
    pub fn feed(&mut self, sample: u16) -> u16 {
        self.window.push(sample);
        self.window.average(self.mode)
    }

    /// Current average without feeding a sample
    pub fn average(&self) -> u16 {
        self.window.average(self.mode)
    }

    /// Underlying window
    pub fn window(&self) -> &ChannelWindow {
        &self.window
    }

    /// Warm-up rule in effect
    pub fn mode(&self) -> WarmupMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_window() {
        let window: SampleWindow<5> = SampleWindow::new(5).unwrap();
        assert!(window.is_empty());
        assert_eq!(window.sum(), 0);
        assert_eq!(window.last(), None);
        assert_eq!(window.average(WarmupMode::FilledOnly), 0);
        assert_eq!(window.average(WarmupMode::ZeroFilled), 0);
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(matches!(
            SampleWindow::<5>::new(0),
            Err(ConfigError::ZeroSamples)
        ));
        assert!(matches!(
            SampleWindow::<5>::new(6),
            Err(ConfigError::SampleCountTooLarge { count: 6, max: 5 })
        ));
    }

    #[test]
    fn circular_overwrite() {
        let mut window = SampleWindow::<8>::new(3).unwrap();

        for value in [10, 20, 30, 40, 50] {
            window.push(value);
        }

        assert!(window.is_full());
        assert_eq!(window.sum(), 120);
        assert_eq!(window.last(), Some(50));

        let values: Vec<u16> = window.iter().collect();
        assert_eq!(values, vec![30, 40, 50]);
    }

    #[test]
    fn zero_filled_warmup_is_biased_low() {
        let mut averager = RollingAverager::new(5, WarmupMode::ZeroFilled).unwrap();

        assert_eq!(averager.feed(600), 120);
        assert_eq!(averager.feed(600), 240);
        assert_eq!(averager.feed(600), 360);
        assert_eq!(averager.feed(600), 480);
        assert_eq!(averager.feed(600), 600);
    }

    #[test]
    fn filled_only_warmup_tracks_input() {
        let mut averager = RollingAverager::new(5, WarmupMode::FilledOnly).unwrap();

        assert_eq!(averager.feed(600), 600);
        assert_eq!(averager.feed(601), 600);
        assert_eq!(averager.feed(605), 602);
    }

    #[test]
    fn modes_agree_once_full() {
        let mut zero = RollingAverager::new(3, WarmupMode::ZeroFilled).unwrap();
        let mut filled = RollingAverager::new(3, WarmupMode::FilledOnly).unwrap();

        for value in [700, 650, 640, 620] {
            zero.feed(value);
            filled.feed(value);
        }

        assert_eq!(zero.average(), filled.average());
        assert_eq!(zero.average(), (650 + 640 + 620) / 3);
    }

    #[test]
    fn integer_division_truncates() {
        let mut averager = RollingAverager::new(3, WarmupMode::ZeroFilled).unwrap();
        averager.feed(1);
        averager.feed(1);
        // (1 + 1 + 0) / 3 truncates to 0
        assert_eq!(averager.average(), 0);
        averager.feed(2);
        // 4 / 3 truncates to 1
        assert_eq!(averager.average(), 1);
    }

    proptest! {
        #[test]
        fn running_sum_matches_last_samples(
            size in 1usize..=MAX_SAMPLES_PER_CYCLE,
            samples in prop::collection::vec(any::<u16>(), 1..64),
        ) {
            let mut window = ChannelWindow::new(size).unwrap();

            for &sample in &samples {
                window.push(sample);

                let stored: u32 = window.iter().map(u32::from).sum();
                prop_assert_eq!(window.sum(), stored);
            }

            let tail = &samples[samples.len().saturating_sub(size)..];
            let expected: u32 = tail.iter().map(|&v| u32::from(v)).sum();
            prop_assert_eq!(window.sum(), expected);

            let order: Vec<u16> = window.iter().collect();
            prop_assert_eq!(order, tail.to_vec());
        }
    }
}
