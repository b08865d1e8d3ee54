//! Analog-to-digital converter abstractions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Converter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AdcInstance {
    Adc1,
}

/// Channel sample time in converter clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SampleTime {
    Cycles3,
    Cycles15,
    Cycles28,
    #[default]
    Cycles56,
    Cycles84,
    Cycles112,
    Cycles144,
    Cycles480,
}

impl SampleTime {
    /// Number of converter clock cycles spent sampling
    pub const fn cycles(self) -> u16 {
        match self {
            SampleTime::Cycles3 => 3,
            SampleTime::Cycles15 => 15,
            SampleTime::Cycles28 => 28,
            SampleTime::Cycles56 => 56,
            SampleTime::Cycles84 => 84,
            SampleTime::Cycles112 => 112,
            SampleTime::Cycles144 => 144,
            SampleTime::Cycles480 => 480,
        }
    }
}

/// Converter control
///
/// The converter clock must be enabled before any of these calls.
pub trait AdcControl {
    /// Power the converter up
    fn power_on(&mut self, adc: AdcInstance);

    /// Power the converter down
    fn power_off(&mut self, adc: AdcInstance);

    /// Program the sample time of one channel (single conversion, no scan)
    fn configure_channel(&mut self, adc: AdcInstance, channel: u8, sample_time: SampleTime);

    /// Run one regular conversion on `channel` and wait for end-of-conversion
    ///
    /// Blocks for a bounded number of converter cycles.
    fn convert_blocking(&mut self, adc: AdcInstance, channel: u8) -> u16;
}
