//! Diagnostic Events Written to the Stream
//!
//! ## Overview
//!
//! Diagnostics are part of the wire protocol, not logging. They are
//! interleaved with data lines on the same stream and collectors tell them
//! apart by prefix:
//!
//! ```text
//! 5000,600,-1
//! ERROR: Sensor on pin A1 reading out of expected range. Check connections.
//! WARNING: No valid reading yet for A1
//! 10000,598,-1
//! ```
//!
//! Data lines always start with a digit or `DATA,`, diagnostics with an
//! upper-case severity word and a colon.
//!
//! ## Rate Limiting
//!
//! `SensorFault` fires once per fault run (edge of the channel's
//! [`FaultLatch`](crate::validators::FaultLatch)). The fallback warnings fire
//! every faulted cycle, so the collector knows each line it sees during a
//! fault run carries a stale or missing value.

use core::fmt;

/// Severity prefix of a diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational, e.g. recovery
    Info,
    /// Degraded but reporting
    Warning,
    /// Needs attention
    Error,
}

impl Severity {
    /// Prefix word as written on the wire
    pub const fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// A diagnostic raised by one channel during one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// First faulted cycle of a fault run
    SensorFault {
        /// Analog input number
        pin: u8,
    },
    /// Faulted cycle reported with the cached value
    UsingLastGood {
        /// Analog input number
        pin: u8,
        /// Cached raw value being reported
        raw: u16,
    },
    /// Faulted cycle with nothing cached yet
    NoUsableReading {
        /// Analog input number
        pin: u8,
    },
    /// First valid cycle after a fault run
    Recovered {
        /// Analog input number
        pin: u8,
    },
}

impl Diagnostic {
    /// Severity of this diagnostic
    pub const fn severity(&self) -> Severity {
        match self {
            Diagnostic::SensorFault { .. } => Severity::Error,
            Diagnostic::UsingLastGood { .. } | Diagnostic::NoUsableReading { .. } => {
                Severity::Warning
            }
            Diagnostic::Recovered { .. } => Severity::Info,
        }
    }

    /// Channel the diagnostic refers to
    pub const fn pin(&self) -> u8 {
        match self {
            Diagnostic::SensorFault { pin }
            | Diagnostic::UsingLastGood { pin, .. }
            | Diagnostic::NoUsableReading { pin }
            | Diagnostic::Recovered { pin } => *pin,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.severity().label();
        match self {
            Diagnostic::SensorFault { pin } => write!(
                f,
                "{}: Sensor on pin A{} reading out of expected range. Check connections.",
                label, pin
            ),
            Diagnostic::UsingLastGood { pin, raw } => {
                write!(f, "{}: Using last good reading for A{}: {}", label, pin, raw)
            }
            Diagnostic::NoUsableReading { pin } => {
                write!(f, "{}: No valid reading yet for A{}", label, pin)
            }
            Diagnostic::Recovered { pin } => {
                write!(f, "{}: Sensor on pin A{} recovered", label, pin)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Diagnostic {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorFault { pin } => defmt::write!(fmt, "A{} out of range", pin),
            Self::UsingLastGood { pin, raw } => defmt::write!(fmt, "A{} last good {}", pin, raw),
            Self::NoUsableReading { pin } => defmt::write!(fmt, "A{} no reading", pin),
            Self::Recovered { pin } => defmt::write!(fmt, "A{} recovered", pin),
        }
    }
}
