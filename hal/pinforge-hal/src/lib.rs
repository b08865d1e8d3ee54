//! Pinforge Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the peripheral shell
//! calls into. Unlike a typestate HAL, every call is addressed by a runtime
//! identifier (port-pin, clock, converter, UART instance) because the shell
//! reassigns pins while the firmware is running.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pinforge-core (lexer, board, shell)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinforge-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ chip register │       │ pinforge-hal- │
//! │     glue      │       │      sim      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`clock::ClockControl`] - Peripheral clock gating
//! - [`gpio::GpioControl`] - Pin mode, pull and level
//! - [`adc::AdcControl`] - Analog converter power and blocking conversion
//! - [`uart::UartControl`] - UART setup, byte I/O and receive flags
//! - [`interrupt::InterruptControl`] - Interrupt controller lines
//!
//! All calls are synchronous and infallible: the register writes behind
//! them cannot fail once the identifiers have been validated by the caller.

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod clock;
pub mod gpio;
pub mod interrupt;
pub mod uart;

// Re-export key types at crate root for convenience
pub use adc::{AdcControl, AdcInstance, SampleTime};
pub use clock::{ClockControl, ClockId};
pub use gpio::{GpioControl, PinMode, Port, PortPin, PortPinError, Pull};
pub use interrupt::{InterruptControl, Irq};
pub use uart::{UartConfig, UartControl, UartInstance};

/// Everything the peripheral shell needs from the hardware
///
/// Implemented automatically for any type providing all the individual
/// controls.
pub trait Hal: ClockControl + GpioControl + AdcControl + UartControl + InterruptControl {}

// Blanket implementation
impl<T: ClockControl + GpioControl + AdcControl + UartControl + InterruptControl> Hal for T {}
