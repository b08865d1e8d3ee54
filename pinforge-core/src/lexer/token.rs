//! Token types produced by the lexer

use core::fmt;

use pinforge_hal::PortPin;

use crate::error::LexError;

/// Byte range of a token within its line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenKind {
    // Line-start keywords
    Input,
    Output,
    Set,
    Reset,
    Toggle,
    Read,
    Adc,
    Uart,
    UartRead,
    UartWrite,
    // Pull keywords
    PullNone,
    PullUp,
    PullDown,
    // Values
    PortPin(PortPin),
    Number(u32),
    /// Double-quoted string; the lexeme includes the quotes
    Str,
    Eol,
    Error(LexError),
}

impl TokenKind {
    /// Match a word against the keyword table (case-sensitive)
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "input" => Self::Input,
            "output" => Self::Output,
            "set" => Self::Set,
            "reset" => Self::Reset,
            "toggle" => Self::Toggle,
            "read" => Self::Read,
            "adc" => Self::Adc,
            "uart" => Self::Uart,
            "none" => Self::PullNone,
            "pup" => Self::PullUp,
            "pdown" => Self::PullDown,
            _ => return None,
        };
        Some(kind)
    }

    /// Check for a keyword that may start a command
    pub fn is_command(self) -> bool {
        matches!(
            self,
            Self::Input
                | Self::Output
                | Self::Set
                | Self::Reset
                | Self::Toggle
                | Self::Read
                | Self::Adc
                | Self::Uart
                | Self::UartRead
                | Self::UartWrite
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
            Self::Set => f.write_str("set"),
            Self::Reset => f.write_str("reset"),
            Self::Toggle => f.write_str("toggle"),
            Self::Read => f.write_str("read"),
            Self::Adc => f.write_str("adc"),
            Self::Uart => f.write_str("uart"),
            Self::UartRead => f.write_str("uart read"),
            Self::UartWrite => f.write_str("uart write"),
            Self::PullNone => f.write_str("none"),
            Self::PullUp => f.write_str("pup"),
            Self::PullDown => f.write_str("pdown"),
            Self::PortPin(pin) => write!(f, "{}", pin),
            Self::Number(n) => write!(f, "{}", n),
            Self::Str => f.write_str("string"),
            Self::Eol => f.write_str("end of line"),
            Self::Error(e) => write!(f, "{}", e),
        }
    }
}

/// One lexed token, borrowing its text from the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Span,
    pub lexeme: &'a str,
}

impl<'a> Token<'a> {
    /// Text between the quotes of a string token
    pub fn string_contents(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Str => self
                .lexeme
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"')),
            _ => None,
        }
    }
}
