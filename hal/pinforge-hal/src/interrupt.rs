//! Interrupt controller abstractions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interrupt line number in the vector table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Irq(pub u16);

/// Interrupt controller line masking
pub trait InterruptControl {
    /// Unmask an interrupt line
    fn enable_irq(&mut self, irq: Irq);

    /// Mask an interrupt line
    fn disable_irq(&mut self, irq: Irq);
}
