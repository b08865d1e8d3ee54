//! Simulated MCU for the pinforge HAL
//!
//! This crate provides a host-side implementation of every `pinforge-hal`
//! trait. It models the registers the shell touches closely enough to check
//! clock discipline: any register access to a peripheral whose clock gate is
//! closed is recorded as a [`Violation`] instead of silently succeeding.
//!
//! # Usage
//!
//! ```
//! use pinforge_hal::{ClockControl, ClockId, Port};
//! use pinforge_hal_sim::SimHal;
//!
//! let mut hal = SimHal::new();
//! hal.enable_clock(ClockId::Gpio(Port::A));
//! assert!(hal.clock_enabled(ClockId::Gpio(Port::A)));
//! ```

pub mod adc;
pub mod gpio;
pub mod uart;

use std::collections::{BTreeSet, HashMap};

use pinforge_hal::{
    AdcInstance, ClockControl, ClockId, InterruptControl, Irq, PinMode, PortPin, Pull,
    UartInstance,
};

pub use adc::SimAdc;
pub use gpio::SimPin;
pub use uart::SimUart;

/// Register access performed while the owning clock was gated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// Clock that should have been running
    pub clock: ClockId,
    /// HAL call that touched the peripheral
    pub operation: &'static str,
}

/// Observable hardware effect, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    ClockEnabled(ClockId),
    ClockDisabled(ClockId),
    PinConfigured(PortPin, PinMode, Pull),
    AdcPowered(AdcInstance, bool),
    UartEnabled(UartInstance),
    UartDisabled(UartInstance),
    IrqEnabled(Irq),
    IrqDisabled(Irq),
}

/// Simulated microcontroller
#[derive(Debug, Default)]
pub struct SimHal {
    clocks: BTreeSet<ClockId>,
    pins: HashMap<PortPin, SimPin>,
    adcs: HashMap<AdcInstance, SimAdc>,
    uarts: HashMap<UartInstance, SimUart>,
    irqs: BTreeSet<Irq>,
    events: Vec<SimEvent>,
    violations: Vec<Violation>,
}

impl SimHal {
    /// Create a simulated MCU with every clock gated
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a clock gate is open
    pub fn clock_enabled(&self, clock: ClockId) -> bool {
        self.clocks.contains(&clock)
    }

    /// All open clock gates, in identifier order
    pub fn enabled_clocks(&self) -> Vec<ClockId> {
        self.clocks.iter().copied().collect()
    }

    /// Check if an interrupt line is unmasked
    pub fn irq_enabled(&self, irq: Irq) -> bool {
        self.irqs.contains(&irq)
    }

    /// Every effect so far, oldest first
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Forget recorded events
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Register accesses made with a gated clock
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    fn record(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    fn require_clock(&mut self, clock: ClockId, operation: &'static str) {
        if !self.clocks.contains(&clock) {
            self.violations.push(Violation { clock, operation });
        }
    }
}

impl ClockControl for SimHal {
    fn enable_clock(&mut self, clock: ClockId) {
        if self.clocks.insert(clock) {
            self.record(SimEvent::ClockEnabled(clock));
        }
    }

    fn disable_clock(&mut self, clock: ClockId) {
        if self.clocks.remove(&clock) {
            self.record(SimEvent::ClockDisabled(clock));
        }
    }
}

impl InterruptControl for SimHal {
    fn enable_irq(&mut self, irq: Irq) {
        self.irqs.insert(irq);
        self.record(SimEvent::IrqEnabled(irq));
    }

    fn disable_irq(&mut self, irq: Irq) {
        self.irqs.remove(&irq);
        self.record(SimEvent::IrqDisabled(irq));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinforge_hal::{GpioControl, Port};

    #[test]
    fn test_clock_gating_recorded_once() {
        let mut hal = SimHal::new();
        hal.enable_clock(ClockId::Gpio(Port::B));
        hal.enable_clock(ClockId::Gpio(Port::B));
        hal.disable_clock(ClockId::Gpio(Port::B));

        assert_eq!(
            hal.events(),
            &[
                SimEvent::ClockEnabled(ClockId::Gpio(Port::B)),
                SimEvent::ClockDisabled(ClockId::Gpio(Port::B)),
            ]
        );
        assert!(hal.enabled_clocks().is_empty());
    }

    #[test]
    fn test_gated_access_is_a_violation() {
        let mut hal = SimHal::new();
        let pin = PortPin::new(Port::C, 3);
        hal.configure(pin, PinMode::Output, Pull::None);

        assert_eq!(
            hal.violations(),
            &[Violation {
                clock: ClockId::Gpio(Port::C),
                operation: "gpio configure",
            }]
        );
    }

    #[test]
    fn test_irq_masking() {
        let mut hal = SimHal::new();
        hal.enable_irq(Irq(37));
        assert!(hal.irq_enabled(Irq(37)));
        hal.disable_irq(Irq(37));
        assert!(!hal.irq_enabled(Irq(37)));
    }
}
