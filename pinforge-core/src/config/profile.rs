//! Board capability profiles
//!
//! A profile is the static description of what the target chip can route
//! where: which pins reach the analog converter, which pins can carry a
//! UART and with which alternate function, and which pins and clocks belong
//! to the firmware itself and must never be handed to the operator.

use pinforge_hal::{AdcInstance, ClockId, Irq, Port, PortPin, UartInstance};

/// Direction a pin takes inside a UART pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartRole {
    Rx,
    Tx,
}

/// Analog-capable pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcPinSpec {
    pub pin: PortPin,
    pub adc: AdcInstance,
    /// Converter input channel
    pub channel: u8,
}

/// UART-capable pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartPinSpec {
    pub pin: PortPin,
    pub uart: UartInstance,
    pub role: UartRole,
    /// Alternate function number routing the pin to `uart`
    pub af: u8,
}

/// Static capability table of one chip/board
#[derive(Debug, Clone, Copy)]
pub struct BoardProfile {
    /// Human readable board name
    pub name: &'static str,
    /// Number of GPIO ports, starting at A
    pub port_count: u8,
    pub adc_pins: &'static [AdcPinSpec],
    pub uart_pins: &'static [UartPinSpec],
    /// Interrupt line of each UART instance
    pub uart_irqs: &'static [(UartInstance, Irq)],
    /// Pins owned by the firmware (console, debug probe)
    pub reserved_pins: &'static [PortPin],
    /// Clocks that stay on for the lifetime of the board
    pub pinned_clocks: &'static [ClockId],
}

impl BoardProfile {
    /// Check if the board has a GPIO port
    pub fn has_port(&self, port: Port) -> bool {
        port.index() < self.port_count
    }

    /// Look up the converter routing of a pin
    pub fn adc_pin(&self, pin: PortPin) -> Option<&AdcPinSpec> {
        self.adc_pins.iter().find(|spec| spec.pin == pin)
    }

    /// Look up the UART routing of a pin
    pub fn uart_pin(&self, pin: PortPin) -> Option<&UartPinSpec> {
        self.uart_pins.iter().find(|spec| spec.pin == pin)
    }

    /// Interrupt line of a UART instance
    pub fn uart_irq(&self, uart: UartInstance) -> Option<Irq> {
        self.uart_irqs
            .iter()
            .find(|(instance, _)| *instance == uart)
            .map(|(_, irq)| *irq)
    }

    /// Check if a pin belongs to the firmware
    pub fn is_reserved(&self, pin: PortPin) -> bool {
        self.reserved_pins.contains(&pin)
    }
}

const fn pp(port: Port, pin: u8) -> PortPin {
    PortPin::new(port, pin)
}

const fn adc1(port: Port, pin: u8, channel: u8) -> AdcPinSpec {
    AdcPinSpec {
        pin: pp(port, pin),
        adc: AdcInstance::Adc1,
        channel,
    }
}

const fn uart(port: Port, pin: u8, uart: UartInstance, role: UartRole, af: u8) -> UartPinSpec {
    UartPinSpec {
        pin: pp(port, pin),
        uart,
        role,
        af,
    }
}

/// STM32F411RE (Nucleo-64)
///
/// The ST-LINK virtual COM port on USART2 (A2/A3) carries the shell itself
/// and the SWD pins (A13/A14) carry the debugger, so all four are reserved.
/// USART2 is left out of the UART table for the same reason.
pub static STM32F411RE: BoardProfile = BoardProfile {
    name: "STM32F411RE",
    port_count: 5,
    adc_pins: &[
        adc1(Port::A, 0, 0),
        adc1(Port::A, 1, 1),
        adc1(Port::A, 4, 4),
        adc1(Port::A, 5, 5),
        adc1(Port::A, 6, 6),
        adc1(Port::A, 7, 7),
        adc1(Port::B, 0, 8),
        adc1(Port::B, 1, 9),
        adc1(Port::C, 0, 10),
        adc1(Port::C, 1, 11),
        adc1(Port::C, 2, 12),
        adc1(Port::C, 3, 13),
        adc1(Port::C, 4, 14),
        adc1(Port::C, 5, 15),
    ],
    uart_pins: &[
        uart(Port::A, 9, UartInstance::Usart1, UartRole::Tx, 7),
        uart(Port::A, 10, UartInstance::Usart1, UartRole::Rx, 7),
        uart(Port::A, 15, UartInstance::Usart1, UartRole::Tx, 7),
        uart(Port::B, 3, UartInstance::Usart1, UartRole::Rx, 7),
        uart(Port::B, 6, UartInstance::Usart1, UartRole::Tx, 7),
        uart(Port::B, 7, UartInstance::Usart1, UartRole::Rx, 7),
        uart(Port::A, 11, UartInstance::Usart6, UartRole::Tx, 8),
        uart(Port::A, 12, UartInstance::Usart6, UartRole::Rx, 8),
        uart(Port::C, 6, UartInstance::Usart6, UartRole::Tx, 8),
        uart(Port::C, 7, UartInstance::Usart6, UartRole::Rx, 8),
    ],
    uart_irqs: &[
        (UartInstance::Usart1, Irq(37)),
        (UartInstance::Usart2, Irq(38)),
        (UartInstance::Usart6, Irq(71)),
    ],
    reserved_pins: &[pp(Port::A, 2), pp(Port::A, 3), pp(Port::A, 13), pp(Port::A, 14)],
    pinned_clocks: &[ClockId::Gpio(Port::A)],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adc_lookup() {
        let spec = STM32F411RE.adc_pin(pp(Port::C, 3)).copied();
        assert_eq!(spec.map(|s| s.channel), Some(13));
        assert!(STM32F411RE.adc_pin(pp(Port::A, 2)).is_none());
    }

    #[test]
    fn test_uart_pairs_share_af_per_instance() {
        for spec in STM32F411RE.uart_pins {
            let expected = match spec.uart {
                UartInstance::Usart6 => 8,
                _ => 7,
            };
            assert_eq!(spec.af, expected);
            assert!(STM32F411RE.uart_irq(spec.uart).is_some());
        }
    }

    #[test]
    fn test_console_pins_reserved() {
        assert!(STM32F411RE.is_reserved(pp(Port::A, 2)));
        assert!(STM32F411RE.is_reserved(pp(Port::A, 3)));
        assert!(!STM32F411RE.is_reserved(pp(Port::A, 0)));
        for spec in STM32F411RE.uart_pins {
            assert!(!STM32F411RE.is_reserved(spec.pin));
        }
    }

    #[test]
    fn test_port_range() {
        assert!(STM32F411RE.has_port(Port::E));
        assert!(!STM32F411RE.has_port(Port::H));
    }
}
