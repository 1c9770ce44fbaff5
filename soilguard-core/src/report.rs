//! Data Line Formatting
//!
//! ## Line Formats
//!
//! | format | line |
//! |---|---|
//! | `Raw` (default) | `<ms>,<raw0>[,<raw1>...]` |
//! | `RawWithPercent` | `<ms>,<raw0>,<pct0>[,<raw1>,<pct1>...]` |
//! | `Data` | `DATA,<raw>,<pct>` (first channel only) |
//!
//! A fallback reading is written like a fresh one; the `WARNING:` line
//! written just before it tells the collector the value is stale.
//!
//! ## Missing Values
//!
//! A channel that has never produced a valid reading has nothing to report.
//! [`MissingPolicy`] decides what the line looks like then:
//!
//! ```text
//! Sentinel      5000,612,-1      field count unchanged, collector parses as usual
//! OmitChannel   5000,612         field count shrinks
//! SuppressLine  (no line)        diagnostics only
//! ```
//!
//! `Sentinel` is the default because the collector rejects any line whose
//! field count differs from the configured channel count.

use core::fmt::Write;

use heapless::String;

use crate::{
    constants::report::{MAX_LINE_LEN, MISSING_VALUE_SENTINEL},
    pipeline::Acquisition,
    time::Timestamp,
};

/// One formatted line, without terminator
pub type ReportLine = String<MAX_LINE_LEN>;

/// Layout of the periodic data line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReportFormat {
    /// `DATA,<raw>,<pct>` for the first channel
    Data,
    /// Timestamp followed by each channel's raw value
    #[default]
    Raw,
    /// Timestamp followed by raw value and percentage per channel
    RawWithPercent,
}

/// What to write for a channel with no usable reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MissingPolicy {
    /// Write `-1` in each of the channel's fields
    #[default]
    Sentinel,
    /// Leave the channel's fields out
    OmitChannel,
    /// Write no data line this cycle
    SuppressLine,
}

/// Turns a cycle's acquisitions into one data line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportEmitter {
    format: ReportFormat,
    missing: MissingPolicy,
}

impl ReportEmitter {
    /// Emitter with the given layout and missing-value policy
    pub const fn new(format: ReportFormat, missing: MissingPolicy) -> Self {
        Self { format, missing }
    }

    /// Line layout
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Missing-value policy
    pub fn missing(&self) -> MissingPolicy {
        self.missing
    }

    /// Format one line for `timestamp`, channels in configuration order
    ///
    /// `None` means no line is written this cycle: the policy suppressed it,
    /// or the line did not fit (logged).
    pub fn format_line(
        &self,
        timestamp: Timestamp,
        channels: &[Acquisition],
    ) -> Option<ReportLine> {
        let mut line = ReportLine::new();

        let written = match self.format {
            ReportFormat::Data => self.write_data(&mut line, channels.first()?),
            ReportFormat::Raw => self.write_fields(&mut line, timestamp, channels, false),
            ReportFormat::RawWithPercent => self.write_fields(&mut line, timestamp, channels, true),
        };

        match written {
            Ok(true) => Some(line),
            Ok(false) => None,
            Err(_) => {
                log_warn!("data line exceeds {} bytes, dropped", MAX_LINE_LEN);
                None
            }
        }
    }

    fn write_data(
        &self,
        line: &mut ReportLine,
        channel: &Acquisition,
    ) -> Result<bool, core::fmt::Error> {
        match channel.reading() {
            Some(reading) => write!(line, "DATA,{},{}", reading.raw_value, reading.percentage)?,
            None => match self.missing {
                MissingPolicy::Sentinel => write!(
                    line,
                    "DATA,{},{}",
                    MISSING_VALUE_SENTINEL, MISSING_VALUE_SENTINEL
                )?,
                MissingPolicy::OmitChannel | MissingPolicy::SuppressLine => return Ok(false),
            },
        }
        Ok(true)
    }

    fn write_fields(
        &self,
        line: &mut ReportLine,
        timestamp: Timestamp,
        channels: &[Acquisition],
        with_percent: bool,
    ) -> Result<bool, core::fmt::Error> {
        if self.missing == MissingPolicy::SuppressLine
            && channels.iter().any(|c| c.reading().is_none())
        {
            return Ok(false);
        }

        write!(line, "{}", timestamp)?;

        for channel in channels {
            match channel.reading() {
                Some(reading) => {
                    write!(line, ",{}", reading.raw_value)?;
                    if with_percent {
                        write!(line, ",{}", reading.percentage)?;
                    }
                }
                None => {
                    if self.missing == MissingPolicy::OmitChannel {
                        continue;
                    }
                    write!(line, ",{}", MISSING_VALUE_SENTINEL)?;
                    if with_percent {
                        write!(line, ",{}", MISSING_VALUE_SENTINEL)?;
                    }
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::SensorFault, pipeline::Reading};

    fn fresh(raw_value: u16, percentage: u8) -> Acquisition {
        Acquisition::Fresh(Reading {
            timestamp: 5000,
            raw_value,
            percentage,
            valid: true,
        })
    }

    fn stale(raw_value: u16, percentage: u8) -> Acquisition {
        Acquisition::Fallback {
            reading: Reading {
                timestamp: 5000,
                raw_value,
                percentage,
                valid: false,
            },
            fault: SensorFault::RailHigh { raw: 1023 },
        }
    }

    fn missing() -> Acquisition {
        Acquisition::Unavailable {
            timestamp: 5000,
            fault: SensorFault::RailHigh { raw: 1023 },
        }
    }

    fn line(emitter: ReportEmitter, channels: &[Acquisition]) -> Option<std::string::String> {
        emitter
            .format_line(5000, channels)
            .map(|l| l.as_str().to_owned())
    }

    #[test]
    fn raw_dual_channel() {
        let emitter = ReportEmitter::default();
        assert_eq!(
            line(emitter, &[fresh(612, 57), fresh(480, 75)]).as_deref(),
            Some("5000,612,480")
        );
    }

    #[test]
    fn fallback_written_like_fresh() {
        let emitter = ReportEmitter::default();
        assert_eq!(
            line(emitter, &[fresh(612, 57), stale(455, 78)]).as_deref(),
            Some("5000,612,455")
        );
    }

    #[test]
    fn data_format_uses_first_channel() {
        let emitter = ReportEmitter::new(ReportFormat::Data, MissingPolicy::Sentinel);
        assert_eq!(
            line(emitter, &[fresh(600, 58), fresh(480, 75)]).as_deref(),
            Some("DATA,600,58")
        );
        assert_eq!(line(emitter, &[]), None);
    }

    #[test]
    fn with_percent() {
        let emitter = ReportEmitter::new(ReportFormat::RawWithPercent, MissingPolicy::Sentinel);
        assert_eq!(
            line(emitter, &[fresh(600, 58), missing()]).as_deref(),
            Some("5000,600,58,-1,-1")
        );
    }

    #[test]
    fn missing_policies() {
        let channels = [fresh(600, 58), missing()];

        let sentinel = ReportEmitter::new(ReportFormat::Raw, MissingPolicy::Sentinel);
        assert_eq!(line(sentinel, &channels).as_deref(), Some("5000,600,-1"));

        let omit = ReportEmitter::new(ReportFormat::Raw, MissingPolicy::OmitChannel);
        assert_eq!(line(omit, &channels).as_deref(), Some("5000,600"));

        let suppress = ReportEmitter::new(ReportFormat::Raw, MissingPolicy::SuppressLine);
        assert_eq!(line(suppress, &channels), None);
        assert_eq!(
            line(suppress, &[fresh(600, 58)]).as_deref(),
            Some("5000,600")
        );
    }

    #[test]
    fn data_format_missing() {
        let sentinel = ReportEmitter::new(ReportFormat::Data, MissingPolicy::Sentinel);
        assert_eq!(line(sentinel, &[missing()]).as_deref(), Some("DATA,-1,-1"));

        let omit = ReportEmitter::new(ReportFormat::Data, MissingPolicy::OmitChannel);
        assert_eq!(line(omit, &[missing()]), None);
    }

    #[test]
    fn widest_line_fits() {
        let emitter = ReportEmitter::new(ReportFormat::RawWithPercent, MissingPolicy::Sentinel);
        let channels = [fresh(4094, 100); 4];

        let formatted = emitter.format_line(u32::MAX, &channels).unwrap();
        assert_eq!(formatted.as_str(), "4294967295,4094,100,4094,100,4094,100,4094,100");
    }
}
