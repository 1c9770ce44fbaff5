//! Rail detector for resistive probes

use crate::{
    constants::sensors::{ADC_10BIT_MAX, ADC_12BIT_MAX},
    errors::SensorFault,
};

/// Converter width, which fixes the rail codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AdcResolution {
    /// 10-bit converter, codes 0..=1023
    #[default]
    Bits10,
    /// 12-bit converter, codes 0..=4095
    Bits12,
}

impl AdcResolution {
    /// Largest code the converter produces
    pub const fn max_code(&self) -> u16 {
        match self {
            AdcResolution::Bits10 => ADC_10BIT_MAX,
            AdcResolution::Bits12 => ADC_12BIT_MAX,
        }
    }
}

/// Classifies raw codes as usable or as a wiring fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultDetector {
    min: u16,
    max: u16,
}

impl Default for FaultDetector {
    fn default() -> Self {
        Self::new(AdcResolution::default())
    }
}

impl FaultDetector {
    /// Detector for the rails of the given converter
    pub const fn new(resolution: AdcResolution) -> Self {
        Self {
            min: 0,
            max: resolution.max_code(),
        }
    }

    /// Lower rail code
    pub const fn min(&self) -> u16 {
        self.min
    }

    /// Upper rail code
    pub const fn max(&self) -> u16 {
        self.max
    }

    /// `Ok` for a usable reading, the fault otherwise
    ///
    /// Codes above the upper rail cannot come from a healthy converter and
    /// are treated as the upper rail.
    pub fn classify(&self, raw: u16) -> Result<(), SensorFault> {
        if raw <= self.min {
            Err(SensorFault::RailLow { raw })
        } else if raw >= self.max {
            Err(SensorFault::RailHigh { raw })
        } else {
            Ok(())
        }
    }

    /// Classify the outcome of a conversion, folding converter errors in
    pub fn check<E>(&self, conversion: Result<u16, E>) -> Result<u16, SensorFault> {
        let raw = conversion.map_err(|_| SensorFault::AdcRead)?;
        self.classify(raw)?;
        Ok(raw)
    }
}
