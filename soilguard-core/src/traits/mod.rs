//! Hardware Seams
//!
//! The node touches the outside world in four places: analog inputs, power
//! outputs, blocking delays and the output stream, plus a millisecond clock.
//! Power outputs and delays use the `embedded-hal` 1.0 traits directly
//! (`OutputPin`, `DelayNs`). The rest are defined here because embedded-hal
//! has no ADC, clock or line-oriented stream abstraction.
//!
//! - [`analog`] - one-shot analog conversions
//! - [`time`] - millisecond clock
//! - [`sink`] - line-oriented output stream
//!
//! Every trait is implemented for `&mut T` / `&T` as appropriate so tests can
//! keep ownership of their fakes and inspect them after a cycle.

pub mod analog;
pub mod sink;
pub mod time;

pub use analog::AnalogInput;
pub use sink::LineSink;
#[cfg(feature = "std")]
pub use sink::WriteSink;
pub use time::TimeSource;
