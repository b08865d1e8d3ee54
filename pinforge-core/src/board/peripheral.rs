//! Live peripheral variants
//!
//! A [`Peripheral`] is one entry in the board's collection. The variant says
//! what the pin(s) currently are; `enabled` says whether the hardware has
//! been programmed. Teardown leaves a [`Peripheral::Vacant`] entry behind
//! that the next create reuses.

use core::fmt;

use heapless::Vec;
use pinforge_hal::{
    AdcInstance, ClockId, GpioControl, Hal, Irq, PinMode, PortPin, Pull, SampleTime, UartConfig,
    UartControl, UartInstance,
};

use crate::ring_buffer::RxBuffer;

/// Most clocks any single peripheral depends on
pub const MAX_PERIPHERAL_CLOCKS: usize = 3;

/// What an active pin currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralKind {
    GpioInput,
    GpioOutput,
    Adc,
    Uart,
}

impl fmt::Display for PeripheralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GpioInput => "digital input",
            Self::GpioOutput => "digital output",
            Self::Adc => "analog input",
            Self::Uart => "UART",
        })
    }
}

/// Digital pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    fn mode(self) -> PinMode {
        match self {
            Self::Input => PinMode::Input,
            Self::Output => PinMode::Output,
        }
    }
}

/// Operation on a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioAction {
    Set,
    Clear,
    Toggle,
    Read,
}

/// Digital input or output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioPin {
    pub pin: PortPin,
    pub direction: Direction,
    pub pull: Pull,
    pub enabled: bool,
}

impl GpioPin {
    pub fn new(pin: PortPin, direction: Direction, pull: Pull) -> Self {
        Self {
            pin,
            direction,
            pull,
            enabled: false,
        }
    }

    fn enable<H: Hal>(&mut self, hal: &mut H) {
        GpioControl::configure(hal, self.pin, self.direction.mode(), self.pull);
        self.enabled = true;
    }
}

/// Analog converter input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcChannel {
    pub pin: PortPin,
    pub adc: AdcInstance,
    pub channel: u8,
    pub sample_time: SampleTime,
    pub enabled: bool,
}

impl AdcChannel {
    fn enable<H: Hal>(&mut self, hal: &mut H) {
        GpioControl::configure(hal, self.pin, PinMode::Analog, Pull::None);
        // Channel setup requires the converter off
        hal.power_off(self.adc);
        hal.configure_channel(self.adc, self.channel, self.sample_time);
        hal.power_on(self.adc);
        self.enabled = true;
    }
}

/// UART with its receive interrupt routed into the shared buffer
#[derive(Debug, Clone, Copy)]
pub struct UartPort<'rx> {
    pub rx: PortPin,
    pub tx: PortPin,
    pub uart: UartInstance,
    pub config: UartConfig,
    pub rx_af: u8,
    pub tx_af: u8,
    pub irq: Irq,
    pub buffer: &'rx RxBuffer,
    pub enabled: bool,
}

impl UartPort<'_> {
    fn enable<H: Hal>(&mut self, hal: &mut H) {
        GpioControl::configure(hal, self.rx, PinMode::Alternate(self.rx_af), Pull::None);
        GpioControl::configure(hal, self.tx, PinMode::Alternate(self.tx_af), Pull::None);
        UartControl::configure(hal, self.uart, &self.config);

        // Stale bytes from a previous UART must not leak into this one
        self.buffer.clear();
        hal.enable_rx_interrupt(self.uart);
        hal.enable_irq(self.irq);
        hal.enable(self.uart);
        self.enabled = true;
    }

    fn disable<H: Hal>(&mut self, hal: &mut H) {
        hal.disable(self.uart);
        hal.disable_irq(self.irq);
        hal.disable_rx_interrupt(self.uart);
        hal.park(self.rx);
        hal.park(self.tx);
        self.enabled = false;
    }
}

/// One entry of the board's peripheral collection
#[derive(Debug, Clone, Copy)]
pub enum Peripheral<'rx> {
    Gpio(GpioPin),
    Adc(AdcChannel),
    Uart(UartPort<'rx>),
    /// Free entry left by a teardown
    Vacant,
}

impl<'rx> Peripheral<'rx> {
    /// Programmed and claiming its pins
    pub fn is_active(&self) -> bool {
        match self {
            Self::Gpio(gpio) => gpio.enabled,
            Self::Adc(adc) => adc.enabled,
            Self::Uart(uart) => uart.enabled,
            Self::Vacant => false,
        }
    }

    /// Type of the peripheral, `None` for a vacant entry
    pub fn kind(&self) -> Option<PeripheralKind> {
        match self {
            Self::Gpio(gpio) => Some(match gpio.direction {
                Direction::Input => PeripheralKind::GpioInput,
                Direction::Output => PeripheralKind::GpioOutput,
            }),
            Self::Adc(_) => Some(PeripheralKind::Adc),
            Self::Uart(_) => Some(PeripheralKind::Uart),
            Self::Vacant => None,
        }
    }

    /// Check if this entry owns a pin
    pub fn claims(&self, pin: PortPin) -> bool {
        match self {
            Self::Gpio(gpio) => gpio.pin == pin,
            Self::Adc(adc) => adc.pin == pin,
            Self::Uart(uart) => uart.rx == pin || uart.tx == pin,
            Self::Vacant => false,
        }
    }

    /// Clocks that must run while this peripheral is enabled
    ///
    /// A UART with both pins on one port lists that port twice; each entry
    /// is one reference.
    pub fn clocks(&self) -> Vec<ClockId, MAX_PERIPHERAL_CLOCKS> {
        let mut clocks = Vec::new();
        // Never more than MAX_PERIPHERAL_CLOCKS pushes below
        match self {
            Self::Gpio(gpio) => {
                let _ = clocks.push(ClockId::Gpio(gpio.pin.port));
            }
            Self::Adc(adc) => {
                let _ = clocks.push(ClockId::Gpio(adc.pin.port));
                let _ = clocks.push(ClockId::Adc(adc.adc));
            }
            Self::Uart(uart) => {
                let _ = clocks.push(ClockId::Gpio(uart.rx.port));
                let _ = clocks.push(ClockId::Gpio(uart.tx.port));
                let _ = clocks.push(ClockId::Uart(uart.uart));
            }
            Self::Vacant => {}
        }
        clocks
    }

    /// Program the hardware; required clocks must already run
    pub fn enable<H: Hal>(&mut self, hal: &mut H) {
        match self {
            Self::Gpio(gpio) => gpio.enable(hal),
            Self::Adc(adc) => adc.enable(hal),
            Self::Uart(uart) => uart.enable(hal),
            Self::Vacant => {}
        }
    }

    /// Release the pins back to floating inputs
    ///
    /// The converter stays powered; the board powers it down once its last
    /// channel is gone.
    pub fn disable<H: Hal>(&mut self, hal: &mut H) {
        match self {
            Self::Gpio(gpio) => {
                hal.park(gpio.pin);
                gpio.enabled = false;
            }
            Self::Adc(adc) => {
                hal.park(adc.pin);
                adc.enabled = false;
            }
            Self::Uart(uart) => uart.disable(hal),
            Self::Vacant => {}
        }
    }
}
