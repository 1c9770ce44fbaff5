//! Acquisition engine for SoilGuard
//!
//! Samples resistive soil-moisture probes, filters the noisy analog codes into
//! a stable moisture estimate, detects open/shorted probes and falls back to
//! the last trusted value while a probe is faulted. Each reporting cycle ends
//! in one comma-separated line on a byte stream.
//!
//! Key constraints:
//! - Runs on a single microcontroller with no persistent storage
//! - No heap allocation anywhere in the cycle
//! - Sensor faults are never fatal; the cycle loop is the only retry
//!
//! ```no_run
//! use soilguard_core::{Calibration, FaultDetector, AdcResolution};
//!
//! let calibration = Calibration::new(1023, 300).unwrap();
//! let detector = FaultDetector::new(AdcResolution::Bits10);
//!
//! let raw = 600;
//! if detector.classify(raw).is_ok() {
//!     assert_eq!(calibration.to_percentage(raw), 58);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod buffer;
pub mod calibration;
pub mod channel;
pub mod constants;
pub mod errors;
pub mod events;
pub mod filter;
pub mod node;
pub mod pipeline;
pub mod power;
pub mod report;
pub mod scheduler;
pub mod time;
pub mod traits;
pub mod validators;

// Public API
pub use buffer::{RollingAverager, SampleWindow, WarmupMode};
pub use calibration::Calibration;
pub use channel::{Channel, ChannelConfig, ChannelState};
pub use errors::{ConfigError, SensorFault, StartupError};
pub use events::{Diagnostic, Severity};
pub use filter::SampleFilter;
pub use node::{CycleReport, Node, NodeConfig};
pub use pipeline::{Acquisition, ChannelOutcome, Reading};
pub use power::{NoPowerPin, PowerController};
pub use report::{MissingPolicy, ReportEmitter, ReportFormat, ReportLine};
pub use scheduler::CycleScheduler;
pub use time::Timestamp;
pub use traits::{AnalogInput, LineSink, TimeSource};
pub use validators::{AdcResolution, FaultDetector, FaultLatch};

/// Crate version, printed in the startup banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
