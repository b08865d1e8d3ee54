//! Simulated analog converter
//!
//! Conversions return whatever sample the test loaded for the channel.

use std::collections::HashMap;

use pinforge_hal::{AdcControl, AdcInstance, ClockId, SampleTime};

use crate::{SimEvent, SimHal};

/// State of one simulated converter
#[derive(Debug, Clone, Default)]
pub struct SimAdc {
    /// Converter powered up
    pub powered: bool,
    /// Channels that have been programmed, with their sample time
    pub channels: HashMap<u8, SampleTime>,
    samples: HashMap<u8, u16>,
    conversions: u32,
}

impl SimAdc {
    /// Number of conversions run so far
    pub fn conversions(&self) -> u32 {
        self.conversions
    }
}

impl SimHal {
    /// Load the value the next conversions on `channel` return
    pub fn set_adc_sample(&mut self, adc: AdcInstance, channel: u8, value: u16) {
        self.adcs.entry(adc).or_default().samples.insert(channel, value & 0x0FFF);
    }

    /// Check if a converter is powered
    pub fn adc_powered(&self, adc: AdcInstance) -> bool {
        self.adcs.get(&adc).is_some_and(|state| state.powered)
    }

    /// Inspect a converter
    pub fn adc(&self, adc: AdcInstance) -> Option<&SimAdc> {
        self.adcs.get(&adc)
    }

    fn adc_mut(&mut self, adc: AdcInstance, operation: &'static str) -> &mut SimAdc {
        self.require_clock(ClockId::Adc(adc), operation);
        self.adcs.entry(adc).or_default()
    }
}

impl AdcControl for SimHal {
    fn power_on(&mut self, adc: AdcInstance) {
        self.adc_mut(adc, "adc power on").powered = true;
        self.record(SimEvent::AdcPowered(adc, true));
    }

    fn power_off(&mut self, adc: AdcInstance) {
        self.adc_mut(adc, "adc power off").powered = false;
        self.record(SimEvent::AdcPowered(adc, false));
    }

    fn configure_channel(&mut self, adc: AdcInstance, channel: u8, sample_time: SampleTime) {
        self.adc_mut(adc, "adc configure")
            .channels
            .insert(channel, sample_time);
    }

    fn convert_blocking(&mut self, adc: AdcInstance, channel: u8) -> u16 {
        let state = self.adc_mut(adc, "adc convert");
        state.conversions += 1;
        state.samples.get(&channel).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinforge_hal::ClockControl;

    #[test]
    fn test_conversion_returns_loaded_sample() {
        let mut hal = SimHal::new();
        hal.enable_clock(ClockId::Adc(AdcInstance::Adc1));
        hal.power_on(AdcInstance::Adc1);
        hal.configure_channel(AdcInstance::Adc1, 4, SampleTime::Cycles84);
        hal.set_adc_sample(AdcInstance::Adc1, 4, 2048);

        assert_eq!(hal.convert_blocking(AdcInstance::Adc1, 4), 2048);
        assert_eq!(hal.convert_blocking(AdcInstance::Adc1, 5), 0);
        assert_eq!(hal.adc(AdcInstance::Adc1).map(SimAdc::conversions), Some(2));
        assert!(hal.violations().is_empty());
    }

    #[test]
    fn test_samples_are_twelve_bit() {
        let mut hal = SimHal::new();
        hal.enable_clock(ClockId::Adc(AdcInstance::Adc1));
        hal.set_adc_sample(AdcInstance::Adc1, 0, 0xFFFF);
        assert_eq!(hal.convert_blocking(AdcInstance::Adc1, 0), 0x0FFF);
    }

    #[test]
    fn test_power_without_clock_is_a_violation() {
        let mut hal = SimHal::new();
        hal.power_on(AdcInstance::Adc1);

        assert_eq!(hal.violations().len(), 1);
        assert_eq!(hal.violations()[0].clock, ClockId::Adc(AdcInstance::Adc1));
    }
}
