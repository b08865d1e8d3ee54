//! Simulated GPIO ports
//!
//! Each touched pin keeps its mode, pull, output latch and an optional
//! externally driven level.

use pinforge_hal::{ClockId, GpioControl, PinMode, PortPin, Pull};

use crate::{SimEvent, SimHal};

/// State of one simulated pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPin {
    /// Current multiplexer setting
    pub mode: PinMode,
    /// Current pull resistor
    pub pull: Pull,
    /// Output data latch
    pub latch: bool,
    /// Level driven onto the pin from outside, if any
    pub external: Option<bool>,
}

impl Default for SimPin {
    fn default() -> Self {
        Self {
            mode: PinMode::Input,
            pull: Pull::None,
            latch: false,
            external: None,
        }
    }
}

impl SimPin {
    /// Level the input data register would show
    pub fn level(&self) -> bool {
        match self.mode {
            PinMode::Output => self.latch,
            _ => self.external.unwrap_or(self.pull == Pull::Up),
        }
    }
}

impl SimHal {
    /// Inspect a pin; untouched pins report their reset state
    pub fn pin(&self, pin: PortPin) -> SimPin {
        self.pins.get(&pin).copied().unwrap_or_default()
    }

    /// Drive a pin from outside the chip (`None` releases it)
    pub fn set_input_level(&mut self, pin: PortPin, level: Option<bool>) {
        self.pins.entry(pin).or_default().external = level;
    }

    fn pin_mut(&mut self, pin: PortPin, operation: &'static str) -> &mut SimPin {
        self.require_clock(ClockId::Gpio(pin.port), operation);
        self.pins.entry(pin).or_default()
    }
}

impl GpioControl for SimHal {
    fn configure(&mut self, pin: PortPin, mode: PinMode, pull: Pull) {
        let state = self.pin_mut(pin, "gpio configure");
        state.mode = mode;
        state.pull = pull;
        self.record(SimEvent::PinConfigured(pin, mode, pull));
    }

    fn set_high(&mut self, pin: PortPin) {
        self.pin_mut(pin, "gpio set").latch = true;
    }

    fn set_low(&mut self, pin: PortPin) {
        self.pin_mut(pin, "gpio clear").latch = false;
    }

    fn toggle(&mut self, pin: PortPin) {
        let state = self.pin_mut(pin, "gpio toggle");
        state.latch = !state.latch;
    }

    fn is_high(&self, pin: PortPin) -> bool {
        self.pin(pin).level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinforge_hal::{ClockControl, Port};

    fn powered() -> SimHal {
        let mut hal = SimHal::new();
        hal.enable_clock(ClockId::Gpio(Port::A));
        hal
    }

    #[test]
    fn test_output_latch() {
        let mut hal = powered();
        let pin = PortPin::new(Port::A, 5);
        hal.configure(pin, PinMode::Output, Pull::None);

        hal.set_high(pin);
        assert!(hal.is_high(pin));
        hal.toggle(pin);
        assert!(hal.is_low(pin));
        assert!(hal.violations().is_empty());
    }

    #[test]
    fn test_input_follows_pull_then_external() {
        let mut hal = powered();
        let pin = PortPin::new(Port::A, 1);
        hal.configure(pin, PinMode::Input, Pull::Up);
        assert!(hal.is_high(pin));

        hal.set_input_level(pin, Some(false));
        assert!(hal.is_low(pin));
    }

    #[test]
    fn test_park_returns_to_reset_state() {
        let mut hal = powered();
        let pin = PortPin::new(Port::A, 7);
        hal.configure(pin, PinMode::Alternate(7), Pull::Down);
        hal.park(pin);

        assert_eq!(hal.pin(pin).mode, PinMode::Input);
        assert_eq!(hal.pin(pin).pull, Pull::None);
    }
}
