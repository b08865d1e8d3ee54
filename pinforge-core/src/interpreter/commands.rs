//! Command handlers
//!
//! One handler per command family. Each handler validates its arguments,
//! resolves them against the board profile and only then touches the
//! board. Multi-pin commands act on each pin as soon as it is read, so a
//! later failure leaves earlier pins changed.

use core::fmt::Write;

use pinforge_hal::{Hal, PortPin, Pull};

use super::resolve::{resolve_adc, resolve_uart};
use crate::board::{Board, Direction, GpioAction, Peripheral, PeripheralKind};
use crate::config::ShellConfig;
use crate::error::{CommandError, GrammarError};
use crate::lexer::{Token, TokenKind};

/// Largest number of bytes one `uart read` can drain
pub const MAX_UART_READ: usize = 64;

/// Everything a handler works on
pub(super) struct Shell<'s, 'rx, H: Hal> {
    pub config: &'s ShellConfig,
    pub board: &'s mut Board<'rx, H>,
    pub out: &'s mut dyn Write,
}

/// Remaining tokens of the line
pub(super) struct Args<'t, 'a> {
    tokens: &'t mut dyn Iterator<Item = Token<'a>>,
}

impl<'t, 'a> Args<'t, 'a> {
    pub fn new(tokens: &'t mut dyn Iterator<Item = Token<'a>>) -> Self {
        Self { tokens }
    }

    /// Next token, with lex errors surfaced
    ///
    /// A stream that stops without an end-of-line token reads as if it had
    /// one.
    pub fn next(&mut self) -> Result<Token<'a>, CommandError> {
        let token = self.tokens.next().unwrap_or(Token {
            kind: TokenKind::Eol,
            span: Default::default(),
            lexeme: "",
        });
        match token.kind {
            TokenKind::Error(error) => Err(CommandError::lex(error, token.lexeme)),
            _ => Ok(token),
        }
    }

    /// Require a port-pin
    pub fn pin(&mut self, what: &'static str) -> Result<PortPin, CommandError> {
        match self.next()?.kind {
            TokenKind::PortPin(pin) => Ok(pin),
            TokenKind::Eol => Err(GrammarError::MissingArgument(what).into()),
            _ => Err(GrammarError::UnexpectedToken.into()),
        }
    }

    /// Require the end of the line
    pub fn end(&mut self) -> Result<(), CommandError> {
        match self.next()?.kind {
            TokenKind::Eol => Ok(()),
            _ => Err(GrammarError::UnexpectedToken.into()),
        }
    }
}

fn pull_of(kind: TokenKind) -> Option<Pull> {
    match kind {
        TokenKind::PullNone => Some(Pull::None),
        TokenKind::PullUp => Some(Pull::Up),
        TokenKind::PullDown => Some(Pull::Down),
        _ => None,
    }
}

/// Tear down a UART that owns `pin`, telling the operator
fn evict_uart<H: Hal>(sh: &mut Shell<'_, '_, H>, pin: PortPin) -> Result<(), CommandError> {
    let Some(Peripheral::Uart(port)) = sh.board.peripheral(pin).copied() else {
        return Ok(());
    };
    sh.board.destroy(pin)?;
    warn!("{} torn down for {}", port.uart, pin);
    let _ = write!(
        sh.out,
        "warning: {} on {}/{} removed\r\n",
        port.uart, port.rx, port.tx
    );
    Ok(())
}

/// `input <pp> <pull>` and `output <pp> <pull>`
pub(super) fn cmd_gpio<H: Hal>(
    sh: &mut Shell<'_, '_, H>,
    args: &mut Args<'_, '_>,
    direction: Direction,
) -> Result<(), CommandError> {
    let mut pin = None;
    let mut pull = None;
    loop {
        let token = args.next()?;
        match token.kind {
            TokenKind::Eol => break,
            TokenKind::PortPin(p) if pin.is_none() => pin = Some(p),
            TokenKind::PortPin(_) => return Err(GrammarError::DuplicatePortPin.into()),
            kind => match pull_of(kind) {
                Some(_) if pull.is_some() => return Err(GrammarError::DuplicatePull.into()),
                Some(p) => pull = Some(p),
                None => return Err(GrammarError::UnexpectedToken.into()),
            },
        }
    }
    let pin = pin.ok_or(GrammarError::MissingArgument("pin"))?;
    let pull = pull.ok_or(GrammarError::MissingArgument("pull"))?;

    sh.board.ensure_assignable(pin)?;
    match sh.board.query(pin) {
        None => sh.board.create_gpio(pin, direction, pull)?,
        Some(PeripheralKind::GpioInput | PeripheralKind::GpioOutput) => {
            sh.board.mutate_gpio(pin, direction, pull)?;
        }
        Some(PeripheralKind::Adc) => sh.board.mutate_adc_to_gpio(pin, direction, pull)?,
        Some(PeripheralKind::Uart) => {
            evict_uart(sh, pin)?;
            sh.board.create_gpio(pin, direction, pull)?;
        }
    }
    Ok(())
}

/// `adc <pp>`
pub(super) fn cmd_adc<H: Hal>(
    sh: &mut Shell<'_, '_, H>,
    args: &mut Args<'_, '_>,
) -> Result<(), CommandError> {
    let pin = args.pin("pin")?;
    args.end()?;

    let spec = resolve_adc(sh.board.profile(), sh.config, pin)?;
    sh.board.ensure_assignable(pin)?;
    match sh.board.query(pin) {
        None => sh.board.create_adc(spec)?,
        Some(PeripheralKind::Adc) => {
            sh.board.mutate_adc(spec)?;
        }
        Some(PeripheralKind::GpioInput | PeripheralKind::GpioOutput) => {
            sh.board.mutate_gpio_to_adc(spec)?;
        }
        Some(PeripheralKind::Uart) => {
            evict_uart(sh, pin)?;
            sh.board.create_adc(spec)?;
        }
    }
    Ok(())
}

/// `set`, `reset`, `toggle` and `read` over one or more pins
pub(super) fn cmd_action<H: Hal>(
    sh: &mut Shell<'_, '_, H>,
    args: &mut Args<'_, '_>,
    action: GpioAction,
) -> Result<(), CommandError> {
    let mut count = 0usize;
    loop {
        let token = args.next()?;
        let pin = match token.kind {
            TokenKind::PortPin(pin) => pin,
            TokenKind::Eol if count > 0 => return Ok(()),
            TokenKind::Eol => return Err(GrammarError::MissingArgument("pin").into()),
            _ => return Err(GrammarError::UnexpectedToken.into()),
        };
        count += 1;

        if action == GpioAction::Read && sh.board.query(pin) == Some(PeripheralKind::Adc) {
            let value = sh.board.act_adc(pin)?;
            let _ = write!(sh.out, "{}={}\r\n", pin, value);
            continue;
        }
        if let Some(level) = sh.board.act_gpio(pin, action)? {
            let _ = write!(sh.out, "{}={}\r\n", pin, u8::from(level));
        }
    }
}

/// `uart <pp> <pp> <baud>`
pub(super) fn cmd_uart<H: Hal>(
    sh: &mut Shell<'_, '_, H>,
    args: &mut Args<'_, '_>,
) -> Result<(), CommandError> {
    let first = args.pin("rx pin")?;
    let second = args.pin("tx pin")?;
    let baud = match args.next()?.kind {
        TokenKind::Number(baud) => baud,
        TokenKind::Eol => return Err(GrammarError::MissingArgument("baud rate").into()),
        _ => return Err(GrammarError::UnexpectedToken.into()),
    };
    args.end()?;

    let spec = resolve_uart(sh.board.profile(), sh.config, first, second, baud)?;
    sh.board.ensure_assignable(spec.rx)?;
    sh.board.ensure_assignable(spec.tx)?;

    for pin in [spec.rx, spec.tx] {
        match sh.board.query(pin) {
            None => {}
            Some(PeripheralKind::Uart) => evict_uart(sh, pin)?,
            Some(kind) => {
                sh.board.destroy(pin)?;
                let _ = write!(sh.out, "warning: {} was {}, released\r\n", pin, kind);
            }
        }
    }
    if let Some(active) = sh.board.active_uart() {
        sh.board.destroy_uart()?;
        warn!("{} replaced", active.uart);
        let _ = write!(sh.out, "warning: {} removed\r\n", active.uart);
    }

    sh.board.create_uart(spec)?;
    Ok(())
}

/// `uart read`
pub(super) fn cmd_uart_read<H: Hal>(
    sh: &mut Shell<'_, '_, H>,
    args: &mut Args<'_, '_>,
) -> Result<(), CommandError> {
    args.end()?;

    let mut buf = [0u8; MAX_UART_READ];
    let limit = sh.config.uart_read_max.clamp(1, MAX_UART_READ);
    let count = sh.board.uart_read(&mut buf[..limit])?;
    if count == 0 {
        return Err(CommandError::UartEmpty);
    }

    let _ = write!(sh.out, "{} bytes: \"", count);
    for &byte in &buf[..count] {
        for c in core::ascii::escape_default(byte) {
            let _ = sh.out.write_char(char::from(c));
        }
    }
    let _ = write!(sh.out, "\"\r\n");
    Ok(())
}

/// `uart write "<text>"`
pub(super) fn cmd_uart_write<H: Hal>(
    sh: &mut Shell<'_, '_, H>,
    args: &mut Args<'_, '_>,
) -> Result<(), CommandError> {
    let token = args.next()?;
    let text = match token.kind {
        TokenKind::Str => token.string_contents().unwrap_or_default(),
        TokenKind::Eol => return Err(GrammarError::MissingArgument("quoted string").into()),
        _ => return Err(GrammarError::UnexpectedToken.into()),
    };
    args.end()?;

    let sent = sh.board.uart_write(text.as_bytes())?;
    let _ = write!(sh.out, "{} bytes sent\r\n", sent);
    Ok(())
}
