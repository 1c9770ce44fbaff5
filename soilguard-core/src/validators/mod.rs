//! Probe Fault Detection
//!
//! ## Why Rails Mean Faults
//!
//! A resistive probe forms one leg of a voltage divider. In any real soil,
//! from dust-dry to waterlogged, the divider output sits somewhere inside
//! the converter's range. It only reaches an extreme when the circuit is
//! broken:
//!
//! - **Upper rail** (e.g. 1023 on a 10-bit converter): open circuit. The
//!   probe is unplugged, a wire is cut, or the probe is out of the soil.
//! - **Lower rail** (0): short circuit, or the probe has no supply.
//!
//! So a rail reading is not "very dry" or "very wet". It is a wiring fault,
//! and the value must not be reported as moisture.
//!
//! ## Edge-Triggered Alarms
//!
//! A disconnected probe stays disconnected for many cycles. Raising an
//! alarm every cycle would bury the data stream, so each channel carries a
//! [`FaultLatch`]: the alarm fires when the latch goes from clear to set,
//! and the latch only clears on the next valid measurement.
//!
//! ```text
//! cycle:     1      2      3      4      5
//! reading:   ok     rail   rail   rail   ok
//! latch:     -      SET    set    set    CLEAR
//! alarm:            ✓
//! ```

mod latch;
mod rail;

pub use latch::FaultLatch;
pub use rail::{AdcResolution, FaultDetector};
