//! UART serial communication abstractions
//!
//! Transmit is blocking per byte. Receive is interrupt driven: the receive
//! interrupt checks [`UartControl::rx_ready`] and drains the data register
//! with [`UartControl::read_byte`] into a software buffer.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// UART/USART hardware instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UartInstance {
    Usart1,
    Usart2,
    Usart6,
}

impl fmt::Display for UartInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UartInstance::Usart1 => "USART1",
            UartInstance::Usart2 => "USART2",
            UartInstance::Usart6 => "USART6",
        })
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Same framing at a different baud rate
    pub const fn with_baudrate(self, baudrate: u32) -> Self {
        Self { baudrate, ..self }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    One,
    Two,
}

/// UART control, transmit and receive-register access
///
/// Flow control is always off; the transceiver runs in TX+RX mode.
pub trait UartControl {
    /// Program framing and baud rate (peripheral must be disabled)
    fn configure(&mut self, uart: UartInstance, config: &UartConfig);

    /// Turn the transceiver on
    fn enable(&mut self, uart: UartInstance);

    /// Turn the transceiver off
    fn disable(&mut self, uart: UartInstance);

    /// Raise an interrupt when a byte is received
    fn enable_rx_interrupt(&mut self, uart: UartInstance);

    /// Stop raising receive interrupts
    fn disable_rx_interrupt(&mut self, uart: UartInstance);

    /// Send one byte, waiting for the transmit register to empty
    fn write_byte(&mut self, uart: UartInstance, byte: u8);

    /// Write data to the UART
    ///
    /// Blocks until all data has been shifted into the transmitter.
    fn write_blocking(&mut self, uart: UartInstance, data: &[u8]) {
        for &byte in data {
            self.write_byte(uart, byte);
        }
    }

    /// Receive register holds an unread byte
    fn rx_ready(&self, uart: UartInstance) -> bool;

    /// A byte arrived before the previous one was read
    fn overrun(&self, uart: UartInstance) -> bool;

    /// Read the receive data register
    ///
    /// Clears both the ready and overrun flags.
    fn read_byte(&mut self, uart: UartInstance) -> u8;
}
