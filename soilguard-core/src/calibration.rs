//! Raw Code to Moisture Percentage
//!
//! A resistive probe reads high in dry soil and low in wet soil, so the map
//! from raw code to percentage is decreasing:
//!
//! ```text
//! percentage = (raw - dry) * 100 / (wet - dry)      clamped to [0, 100]
//!
//!   raw:   dry=1023 ─────────── 600 ─────────── wet=300
//!   pct:        0 ───────────── 58 ──────────── 100
//! ```
//!
//! Integer arithmetic throughout, truncating toward zero, so results match
//! what the node has always reported. Values beyond either bound clamp.

use crate::{
    constants::sensors::{DEFAULT_DRY_RAW, DEFAULT_WET_RAW},
    errors::{ConfigError, ConfigResult},
};

/// Dry/wet calibration bounds of one probe, in raw converter codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    dry: u16,
    wet: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::reference()
    }
}

impl Calibration {
    /// Bounds of the reference probe on a 10-bit converter
    pub const fn reference() -> Self {
        Self {
            dry: DEFAULT_DRY_RAW,
            wet: DEFAULT_WET_RAW,
        }
    }

    /// Create bounds; `dry` must be strictly greater than `wet`
    pub const fn new(dry: u16, wet: u16) -> ConfigResult<Self> {
        if dry <= wet {
            return Err(ConfigError::InvertedCalibration { dry, wet });
        }
        Ok(Self { dry, wet })
    }

    /// Raw code in dry air
    pub const fn dry(&self) -> u16 {
        self.dry
    }

    /// Raw code in water
    pub const fn wet(&self) -> u16 {
        self.wet
    }

    /// Re-check the ordering, for values that bypassed `new` (deserialized)
    pub const fn validate(&self) -> ConfigResult<()> {
        match Self::new(self.dry, self.wet) {
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Map a raw code to a moisture percentage in `[0, 100]`
    pub fn to_percentage(&self, raw: u16) -> u8 {
        let span = i32::from(self.wet) - i32::from(self.dry);
        if span == 0 {
            return 0;
        }

        let pct = (i32::from(raw) - i32::from(self.dry)) * 100 / span;
        pct.clamp(0, 100) as u8
    }
}
