//! Board-agnostic core of the pinforge peripheral shell
//!
//! This crate contains everything between a line of operator text and the
//! hardware abstraction traits:
//!
//! - Command lexer and interpreter
//! - Peripheral resource manager with reference-counted clocks
//! - Lock-free receive ring buffer and its interrupt service routine
//! - Board capability profiles and shell configuration
//!
//! # Data flow
//!
//! ```text
//! line ─▶ lexer ─▶ interpreter ─▶ board ─▶ HAL
//!                                   │
//!          RX ISR ─▶ ring buffer ◀──┘ (uart read)
//! ```
//!
//! # Example
//!
//! ```
//! use pinforge_core::board::{Board, PeripheralKind};
//! use pinforge_core::config::STM32F411RE;
//! use pinforge_core::interpreter::Interpreter;
//! use pinforge_core::ring_buffer::RxBuffer;
//! use pinforge_hal::{Port, PortPin};
//! use pinforge_hal_sim::SimHal;
//!
//! static RX: RxBuffer = RxBuffer::new();
//!
//! let mut board = Board::new(SimHal::new(), &STM32F411RE, &RX);
//! let shell = Interpreter::default();
//! let mut out = String::new();
//!
//! shell.run_line(&mut board, "output A5 none", &mut out).unwrap();
//! shell.run_line(&mut board, "set A5", &mut out).unwrap();
//! assert_eq!(board.query(PortPin::new(Port::A, 5)), Some(PeripheralKind::GpioOutput));
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

// Must come first so the logging macros are visible everywhere
#[macro_use]
mod fmt;

pub mod board;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
#[allow(unsafe_code)]
pub mod ring_buffer;
pub mod rx;

pub use board::Board;
pub use error::{CommandError, ErrorClass};
pub use interpreter::Interpreter;
pub use ring_buffer::{RingBuffer, RxBuffer};
