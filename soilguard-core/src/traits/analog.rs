//! One-shot analog conversions

/// A single analog input channel
///
/// `read` performs one blocking conversion and returns the raw code. Board
/// support wraps its ADC driver and pin in a type implementing this; the
/// pipeline never needs to know the converter's width beyond the rails
/// configured through [`crate::validators::AdcResolution`].
///
/// ```rust
/// use soilguard_core::traits::AnalogInput;
/// use core::convert::Infallible;
///
/// struct FixedProbe(u16);
///
/// impl AnalogInput for FixedProbe {
///     type Error = Infallible;
///
///     fn read(&mut self) -> Result<u16, Self::Error> {
///         Ok(self.0)
///     }
/// }
/// ```
pub trait AnalogInput {
    /// Converter error type
    type Error: core::fmt::Debug;

    /// Perform one conversion
    fn read(&mut self) -> Result<u16, Self::Error>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    type Error = T::Error;

    fn read(&mut self) -> Result<u16, Self::Error> {
        T::read(self)
    }
}
