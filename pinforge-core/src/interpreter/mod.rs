//! Command interpreter
//!
//! Consumes the tokens of one line, checks the grammar of the command the
//! first token names, resolves pins against the board profile and drives
//! the [`Board`]. Result lines (`read` values, received UART data) and
//! warnings go to the output sink; the verdict is the returned `Result`.
//!
//! Per command: validate, resolve, act, report. Nothing is retried and
//! nothing is rolled back.

mod commands;
pub mod resolve;

pub use commands::MAX_UART_READ;

use core::fmt::Write;

use pinforge_hal::Hal;

use crate::board::{Board, Direction, GpioAction};
use crate::config::ShellConfig;
use crate::error::{CommandError, GrammarError};
use crate::lexer::{tokenize, Token, TokenKind};

use commands::{Args, Shell};

/// Stateless command dispatcher
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: ShellConfig,
}

impl Interpreter {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Lex and execute one line
    ///
    /// Port letters are accepted up to the board profile's port count.
    pub fn run_line<H: Hal>(
        &self,
        board: &mut Board<'_, H>,
        line: &str,
        out: &mut dyn Write,
    ) -> Result<(), CommandError> {
        let port_count = board.profile().port_count;
        self.execute(board, tokenize(line, port_count), out)
    }

    /// Execute an already lexed line
    ///
    /// An empty line (just end-of-line) succeeds without doing anything.
    pub fn execute<'a, H: Hal>(
        &self,
        board: &mut Board<'_, H>,
        tokens: impl IntoIterator<Item = Token<'a>>,
        out: &mut dyn Write,
    ) -> Result<(), CommandError> {
        let mut tokens = tokens.into_iter();
        let mut args = Args::new(&mut tokens);
        let mut sh = Shell {
            config: &self.config,
            board,
            out,
        };

        let result = dispatch(&mut sh, &mut args);
        if let Err(e) = &result {
            debug!("command rejected: {}", e);
        }
        result
    }
}

fn dispatch<H: Hal>(sh: &mut Shell<'_, '_, H>, args: &mut Args<'_, '_>) -> Result<(), CommandError> {
    let head = args.next()?;
    match head.kind {
        TokenKind::Eol => Ok(()),
        TokenKind::Input => commands::cmd_gpio(sh, args, Direction::Input),
        TokenKind::Output => commands::cmd_gpio(sh, args, Direction::Output),
        TokenKind::Set => commands::cmd_action(sh, args, GpioAction::Set),
        TokenKind::Reset => commands::cmd_action(sh, args, GpioAction::Clear),
        TokenKind::Toggle => commands::cmd_action(sh, args, GpioAction::Toggle),
        TokenKind::Read => commands::cmd_action(sh, args, GpioAction::Read),
        TokenKind::Adc => commands::cmd_adc(sh, args),
        TokenKind::Uart => commands::cmd_uart(sh, args),
        TokenKind::UartRead => commands::cmd_uart_read(sh, args),
        TokenKind::UartWrite => commands::cmd_uart_write(sh, args),
        _ => Err(GrammarError::NotACommand.into()),
    }
}
