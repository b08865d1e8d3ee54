//! GPIO pin abstractions
//!
//! Pins are addressed at runtime by [`PortPin`] so the same physical pin can
//! be handed from one peripheral to another without typestate juggling.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest pin index within a port
pub const MAX_PIN: u8 = 15;

/// Upper bound on ports addressable by a single letter
pub const MAX_PORTS: u8 = 26;

/// GPIO port ordinal (0 = port A)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Port(u8);

impl Port {
    pub const A: Port = Port(0);
    pub const B: Port = Port(1);
    pub const C: Port = Port(2);
    pub const D: Port = Port(3);
    pub const E: Port = Port(4);
    pub const H: Port = Port(7);

    /// Create a port from its ordinal
    ///
    /// Returns `None` if the ordinal cannot be written as a single letter.
    pub const fn new(index: u8) -> Option<Self> {
        if index < MAX_PORTS {
            Some(Port(index))
        } else {
            None
        }
    }

    /// Decode a port letter, case-insensitive
    pub fn from_letter(letter: char) -> Option<Self> {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        Some(Port(letter.to_ascii_uppercase() as u8 - b'A'))
    }

    /// Port ordinal (0 = A)
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Upper-case port letter
    pub const fn letter(self) -> char {
        (b'A' + self.0) as char
    }
}

/// A single physical pin: port plus bit index 0-15
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortPin {
    /// GPIO port
    pub port: Port,
    /// Bit index within the port
    pub pin: u8,
}

/// Reasons a port-pin identifier fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortPinError {
    /// No characters
    Empty,
    /// First character is not a letter
    InvalidPort,
    /// Letter names a port the board does not have
    PortOutOfRange,
    /// Pin digits missing, not decimal, or more than two of them
    InvalidPin,
    /// Pin number above 15
    PinOutOfRange,
}

impl fmt::Display for PortPinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Empty => "empty pin identifier",
            Self::InvalidPort => "port must be a letter",
            Self::PortOutOfRange => "no such port",
            Self::InvalidPin => "pin must be one or two digits",
            Self::PinOutOfRange => "pin must be 0-15",
        };
        f.write_str(msg)
    }
}

impl PortPin {
    /// Create a port-pin without range checking the pin
    pub const fn new(port: Port, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Parse a pin string such as `A5`, `b12` or `c03`
    ///
    /// `port_count` bounds the accepted port letters (5 accepts A-E).
    pub fn parse(s: &str, port_count: u8) -> Result<Self, PortPinError> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or(PortPinError::Empty)?;
        let port = Port::from_letter(letter).ok_or(PortPinError::InvalidPort)?;
        if port.index() >= port_count {
            return Err(PortPinError::PortOutOfRange);
        }

        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PortPinError::InvalidPin);
        }

        let pin = digits
            .bytes()
            .fold(0u8, |acc, b| acc * 10 + (b - b'0'));
        if pin > MAX_PIN {
            return Err(PortPinError::PinOutOfRange);
        }

        Ok(Self { port, pin })
    }

    /// Bit mask of this pin within its port register
    pub const fn mask(self) -> u16 {
        1 << self.pin
    }
}

impl fmt::Display for PortPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.port.letter(), self.pin)
    }
}

/// Pin multiplexer setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Digital input
    Input,
    /// Push-pull digital output
    Output,
    /// Analog (converter input, digital buffer off)
    Analog,
    /// Routed to an internal peripheral by alternate-function number
    Alternate(u8),
}

/// Internal pull resistor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

impl fmt::Display for Pull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pull::None => "none",
            Pull::Up => "pup",
            Pull::Down => "pdown",
        })
    }
}

/// Port-addressed GPIO control
///
/// Implementations handle the actual mode, pull and data register access
/// for the specific chip. The port clock is managed separately through
/// [`ClockControl`](crate::clock::ClockControl) and must be running.
pub trait GpioControl {
    /// Set mode and pull resistor of a pin
    fn configure(&mut self, pin: PortPin, mode: PinMode, pull: Pull);

    /// Drive the pin high (logic 1)
    fn set_high(&mut self, pin: PortPin);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self, pin: PortPin);

    /// Invert the output latch
    fn toggle(&mut self, pin: PortPin);

    /// Check if the pin reads high (logic 1)
    fn is_high(&self, pin: PortPin) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self, pin: PortPin) -> bool {
        !self.is_high(pin)
    }

    /// Return a pin to its reset state (floating input)
    fn park(&mut self, pin: PortPin) {
        self.configure(pin, PinMode::Input, Pull::None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(PortPin::parse("A5", 5), Ok(PortPin::new(Port::A, 5)));
        assert_eq!(PortPin::parse("b12", 5), Ok(PortPin::new(Port::B, 12)));
        assert_eq!(PortPin::parse("a06", 5), Ok(PortPin::new(Port::A, 6)));
        assert_eq!(PortPin::parse("E15", 5), Ok(PortPin::new(Port::E, 15)));
    }

    #[test]
    fn test_parse_rejects_bad_pins() {
        assert_eq!(PortPin::parse("", 5), Err(PortPinError::Empty));
        assert_eq!(PortPin::parse("9A", 5), Err(PortPinError::InvalidPort));
        assert_eq!(PortPin::parse("F1", 5), Err(PortPinError::PortOutOfRange));
        assert_eq!(PortPin::parse("Z9", 5), Err(PortPinError::PortOutOfRange));
        assert_eq!(PortPin::parse("A", 5), Err(PortPinError::InvalidPin));
        assert_eq!(PortPin::parse("A123", 5), Err(PortPinError::InvalidPin));
        assert_eq!(PortPin::parse("A1x", 5), Err(PortPinError::InvalidPin));
        assert_eq!(PortPin::parse("A16", 5), Err(PortPinError::PinOutOfRange));
    }

    #[test]
    fn test_display_is_upper_case() {
        let pin = PortPin::parse("c7", 5).unwrap();
        let mut buf = [0u8; 8];
        let mut w = Cursor { buf: &mut buf, len: 0 };
        fmt::write(&mut w, format_args!("{}", pin)).unwrap();
        let len = w.len;
        assert_eq!(&buf[..len], b"C7");
    }

    #[test]
    fn test_mask() {
        assert_eq!(PortPin::new(Port::A, 0).mask(), 0x0001);
        assert_eq!(PortPin::new(Port::A, 15).mask(), 0x8000);
    }

    #[test]
    fn test_port_letters() {
        assert_eq!(Port::from_letter('a'), Some(Port::A));
        assert_eq!(Port::from_letter('E'), Some(Port::E));
        assert_eq!(Port::from_letter('_'), None);
        assert_eq!(Port::H.letter(), 'H');
        assert_eq!(Port::new(26), None);
    }

    struct Cursor<'a> {
        buf: &'a mut [u8],
        len: usize,
    }

    impl fmt::Write for Cursor<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let bytes = s.as_bytes();
            let end = self.len + bytes.len();
            if end > self.buf.len() {
                return Err(fmt::Error);
            }
            self.buf[self.len..end].copy_from_slice(bytes);
            self.len = end;
            Ok(())
        }
    }
}
