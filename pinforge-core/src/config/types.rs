//! Shell configuration types
//!
//! Runtime-tunable settings of the command shell. With the `serde` feature
//! these can be stored as postcard-serialized binary data (see
//! [`persist`](super::persist)).

use heapless::Vec;
use pinforge_hal::{SampleTime, UartConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum entries in the baud rate allow-list
pub const MAX_BAUD_RATES: usize = 8;

/// Default bytes drained by one `uart read`
pub const DEFAULT_UART_READ_MAX: usize = 32;

/// Default baud rate allow-list
pub const DEFAULT_BAUD_RATES: [u32; 3] = [9600, 57600, 115200];

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShellConfig {
    /// Baud rates accepted by the `uart` command
    pub baud_rates: Vec<u32, MAX_BAUD_RATES>,
    /// Sample time programmed for every new analog channel
    pub adc_sample_time: SampleTime,
    /// Framing used for new UARTs; the baud rate is taken from the command
    pub uart: UartConfig,
    /// Bytes drained by one `uart read`
    pub uart_read_max: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let mut baud_rates = Vec::new();
        for rate in DEFAULT_BAUD_RATES {
            let _ = baud_rates.push(rate);
        }
        Self {
            baud_rates,
            adc_sample_time: SampleTime::default(),
            uart: UartConfig::default(),
            uart_read_max: DEFAULT_UART_READ_MAX,
        }
    }
}

impl ShellConfig {
    /// Check a baud rate against the allow-list
    pub fn baud_allowed(&self, baud: u32) -> bool {
        self.baud_rates.contains(&baud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_baud_rates() {
        let config = ShellConfig::default();
        assert!(config.baud_allowed(115200));
        assert!(config.baud_allowed(9600));
        assert!(!config.baud_allowed(4800));
    }

    #[test]
    fn test_default_read_limit() {
        assert_eq!(ShellConfig::default().uart_read_max, 32);
    }
}
