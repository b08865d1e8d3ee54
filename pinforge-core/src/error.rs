//! Error types
//!
//! Each layer has its own error enum; [`CommandError`] wraps them at the
//! interpreter boundary. Nothing here is fatal: every error is reported to
//! the operator and the shell carries on with the next line.

use core::fmt;

use heapless::String;
use pinforge_hal::{Port, PortPin, PortPinError, UartInstance};

use crate::board::PeripheralKind;

/// Longest lexeme quoted back in a lex error
pub const MAX_LEXEME_LEN: usize = 16;

/// Malformed input text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LexError {
    /// Not a keyword, pin, number or string
    UnrecognizedToken,
    /// Looks like a pin but does not name one on this board
    InvalidPortPin(PortPinError),
    /// Missing closing quote
    UnterminatedString,
    /// Does not fit in 32 bits
    NumberTooLarge,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedToken => f.write_str("unrecognized token"),
            Self::InvalidPortPin(e) => write!(f, "invalid pin ({})", e),
            Self::UnterminatedString => f.write_str("unterminated string"),
            Self::NumberTooLarge => f.write_str("number too large"),
        }
    }
}

/// Well-formed tokens in the wrong arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GrammarError {
    /// First token does not start a command
    NotACommand,
    /// A required argument is absent
    MissingArgument(&'static str),
    /// Token not allowed at this position
    UnexpectedToken,
    /// Pin given twice where only one is taken
    DuplicatePortPin,
    /// Pull given twice
    DuplicatePull,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotACommand => f.write_str("not a command"),
            Self::MissingArgument(what) => write!(f, "missing {}", what),
            Self::UnexpectedToken => f.write_str("unexpected argument"),
            Self::DuplicatePortPin => f.write_str("pin given more than once"),
            Self::DuplicatePull => f.write_str("pull given more than once"),
        }
    }
}

/// Identifiers that do not map onto the board's capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolveError {
    /// Pin is not wired to a converter channel
    NotAdcCapable(PortPin),
    /// Pin cannot carry a UART signal
    NotUartCapable(PortPin),
    /// UART pair is not one RX pin and one TX pin
    UartRoleMismatch,
    /// UART pins belong to different instances
    UartInstanceMismatch,
    /// Same pin given for RX and TX
    SamePin,
    /// Baud rate not in the allow-list
    InvalidBaud(u32),
    /// Profile has no interrupt line for the instance
    NoUartIrq(UartInstance),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAdcCapable(pin) => write!(f, "{} has no analog input", pin),
            Self::NotUartCapable(pin) => write!(f, "{} cannot carry a UART", pin),
            Self::UartRoleMismatch => f.write_str("UART needs one RX pin and one TX pin"),
            Self::UartInstanceMismatch => f.write_str("UART pins belong to different instances"),
            Self::SamePin => f.write_str("RX and TX must be different pins"),
            Self::InvalidBaud(baud) => write!(f, "unsupported baud rate {}", baud),
            Self::NoUartIrq(uart) => write!(f, "{} has no interrupt line", uart),
        }
    }
}

/// Peripheral resource manager failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    /// Port is outside the board profile, so it has no clock
    ClockUnavailable(Port),
    /// Pin belongs to the firmware
    PinReserved(PortPin),
    /// Pin already claimed by an active peripheral
    SlotOccupied(PortPin),
    /// No active peripheral on the pin
    NotConfigured(PortPin),
    /// Active peripheral on the pin is of another type
    WrongPeripheral { pin: PortPin, found: PeripheralKind },
    /// Output action on an input pin
    NotOutput(PortPin),
    /// Read on an output pin
    NotInput(PortPin),
    /// Another UART is active
    UartBusy(UartInstance),
    /// No UART is active
    NoUart,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockUnavailable(port) => write!(f, "port {} not on this board", port.letter()),
            Self::PinReserved(pin) => write!(f, "{} is reserved", pin),
            Self::SlotOccupied(pin) => write!(f, "{} is in use", pin),
            Self::NotConfigured(pin) => write!(f, "{} is not configured", pin),
            Self::WrongPeripheral { pin, found } => write!(f, "{} is {}", pin, found),
            Self::NotOutput(pin) => write!(f, "{} is not an output", pin),
            Self::NotInput(pin) => write!(f, "{} is not an input", pin),
            Self::UartBusy(uart) => write!(f, "{} already active", uart),
            Self::NoUart => f.write_str("no UART configured"),
        }
    }
}

/// Error taxonomy reported to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorClass {
    Lex,
    Grammar,
    Resolution,
    State,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lex => "lex error",
            Self::Grammar => "syntax error",
            Self::Resolution => "resolution error",
            Self::State => "state error",
        })
    }
}

/// Why a command line was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Bad token, quoted back (truncated) for the operator
    Lex {
        error: LexError,
        lexeme: String<MAX_LEXEME_LEN>,
    },
    Grammar(GrammarError),
    Resolve(ResolveError),
    Board(BoardError),
    /// `uart read` found nothing to drain
    UartEmpty,
}

impl CommandError {
    /// Build a lex error, keeping as much of the lexeme as fits
    pub fn lex(error: LexError, lexeme: &str) -> Self {
        let mut quoted = String::new();
        for c in lexeme.chars() {
            if quoted.push(c).is_err() {
                break;
            }
        }
        Self::Lex {
            error,
            lexeme: quoted,
        }
    }

    /// Taxonomy bucket of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Lex { .. } => ErrorClass::Lex,
            Self::Grammar(_) => ErrorClass::Grammar,
            Self::Resolve(_) => ErrorClass::Resolution,
            Self::Board(BoardError::ClockUnavailable(_) | BoardError::PinReserved(_)) => {
                ErrorClass::Resolution
            }
            Self::Board(_) | Self::UartEmpty => ErrorClass::State,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex { error, lexeme } => write!(f, "{} '{}'", error, lexeme),
            Self::Grammar(e) => write!(f, "{}", e),
            Self::Resolve(e) => write!(f, "{}", e),
            Self::Board(e) => write!(f, "{}", e),
            Self::UartEmpty => f.write_str("no data received"),
        }
    }
}

impl From<GrammarError> for CommandError {
    fn from(e: GrammarError) -> Self {
        Self::Grammar(e)
    }
}

impl From<ResolveError> for CommandError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

impl From<BoardError> for CommandError {
    fn from(e: BoardError) -> Self {
        Self::Board(e)
    }
}
