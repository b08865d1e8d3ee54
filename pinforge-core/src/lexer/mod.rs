//! Command line lexer
//!
//! Turns one line of operator input into a finite stream of [`Token`]s that
//! always ends with a single [`TokenKind::Eol`]. Lexing never fails as a
//! whole: malformed input becomes [`TokenKind::Error`] tokens and it is up
//! to the interpreter to reject them.
//!
//! # Example
//!
//! ```
//! use pinforge_core::lexer::{tokenize, TokenKind};
//! use pinforge_hal::{Port, PortPin};
//!
//! let kinds: Vec<_> = tokenize("input a06 pdown", 5).map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::Input,
//!         TokenKind::PortPin(PortPin::new(Port::A, 6)),
//!         TokenKind::PullDown,
//!         TokenKind::Eol,
//!     ]
//! );
//! ```

mod token;

pub use token::{Span, Token, TokenKind};

use core::iter::FusedIterator;

use pinforge_hal::PortPin;

use crate::error::LexError;

/// Lex a line
///
/// `port_count` bounds the port letters accepted in pin identifiers.
pub fn tokenize(line: &str, port_count: u8) -> Lexer<'_> {
    Lexer::new(line, port_count)
}

/// Lazy token stream over one line
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    line: &'a str,
    pos: usize,
    port_count: u8,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(line: &'a str, port_count: u8) -> Self {
        Self {
            line,
            pos: 0,
            port_count,
            done: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.line.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token {
            kind,
            span: Span::new(start, self.pos),
            lexeme: &self.line[start..self.pos],
        }
    }

    fn word(&mut self, start: usize) -> Token<'a> {
        let line = self.line;
        self.take_while(is_word_byte);
        let word = &line[start..self.pos];

        let kind = match TokenKind::keyword(word) {
            Some(TokenKind::Uart) => self.uart_suffix(),
            Some(kind) => kind,
            None => self.port_pin(word),
        };
        self.token(kind, start)
    }

    /// Fold a following `read`/`write` into the `uart` keyword
    fn uart_suffix(&mut self) -> TokenKind {
        let resume = self.pos;
        self.skip_whitespace();
        let start = self.pos;
        self.take_while(is_word_byte);

        match &self.line[start..self.pos] {
            "read" => TokenKind::UartRead,
            "write" => TokenKind::UartWrite,
            _ => {
                self.pos = resume;
                TokenKind::Uart
            }
        }
    }

    fn port_pin(&self, word: &str) -> TokenKind {
        // Only a letter followed by digits is a pin attempt
        let pin_shaped = word
            .as_bytes()
            .split_first()
            .is_some_and(|(first, rest)| {
                first.is_ascii_alphabetic() && rest.iter().all(u8::is_ascii_digit)
            });
        if !pin_shaped {
            return TokenKind::Error(LexError::UnrecognizedToken);
        }

        match PortPin::parse(word, self.port_count) {
            Ok(pin) => TokenKind::PortPin(pin),
            Err(e) => TokenKind::Error(LexError::InvalidPortPin(e)),
        }
    }

    fn number(&mut self, start: usize) -> Token<'a> {
        self.take_while(|b| b.is_ascii_digit());
        let value = self.line.as_bytes()[start..self.pos]
            .iter()
            .try_fold(0u32, |acc, b| {
                acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
            });

        let kind = match value {
            Some(n) => TokenKind::Number(n),
            None => TokenKind::Error(LexError::NumberTooLarge),
        };
        self.token(kind, start)
    }

    fn string(&mut self, start: usize) -> Token<'a> {
        self.pos += 1;
        self.take_while(|b| b != b'"');

        let kind = if self.peek() == Some(b'"') {
            self.pos += 1;
            TokenKind::Str
        } else {
            TokenKind::Error(LexError::UnterminatedString)
        };
        self.token(kind, start)
    }

    fn unrecognized(&mut self, start: usize) -> Token<'a> {
        let width = self.line[start..].chars().next().map_or(1, char::len_utf8);
        self.pos += width;
        self.token(TokenKind::Error(LexError::UnrecognizedToken), start)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.skip_whitespace();
        let start = self.pos;
        let token = match self.peek() {
            None => {
                self.done = true;
                self.token(TokenKind::Eol, start)
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.word(start),
            Some(b) if b.is_ascii_digit() => self.number(start),
            Some(b'"') => self.string(start),
            Some(_) => self.unrecognized(start),
        };
        Some(token)
    }
}

impl FusedIterator for Lexer<'_> {}
