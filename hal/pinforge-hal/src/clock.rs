//! Peripheral clock gating
//!
//! Every GPIO port and on-chip peripheral sits behind a clock gate that must
//! be open before its registers respond.

use crate::adc::AdcInstance;
use crate::gpio::Port;
use crate::uart::UartInstance;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one gateable clock domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClockId {
    /// GPIO port bus clock
    Gpio(Port),
    /// Analog converter clock, shared by all its channels
    Adc(AdcInstance),
    /// UART/USART peripheral clock
    Uart(UartInstance),
}

/// Clock gate control
pub trait ClockControl {
    /// Open the clock gate
    fn enable_clock(&mut self, clock: ClockId);

    /// Close the clock gate
    fn disable_clock(&mut self, clock: ClockId);
}
