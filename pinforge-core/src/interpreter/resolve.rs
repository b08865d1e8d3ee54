//! Capability resolution
//!
//! Maps operator identifiers onto the board profile. Everything here is pure
//! so a command can be rejected before any hardware is touched.

use pinforge_hal::PortPin;

use crate::board::{AdcSpec, UartSpec};
use crate::config::{BoardProfile, ShellConfig, UartRole};
use crate::error::ResolveError;

/// Converter routing for an analog input on `pin`
pub fn resolve_adc(
    profile: &BoardProfile,
    config: &ShellConfig,
    pin: PortPin,
) -> Result<AdcSpec, ResolveError> {
    let spec = profile
        .adc_pin(pin)
        .ok_or(ResolveError::NotAdcCapable(pin))?;

    Ok(AdcSpec {
        pin,
        adc: spec.adc,
        channel: spec.channel,
        sample_time: config.adc_sample_time,
    })
}

/// UART routing for a pin pair given in either order
///
/// The pair must be one RX and one TX pin of the same instance.
pub fn resolve_uart(
    profile: &BoardProfile,
    config: &ShellConfig,
    first: PortPin,
    second: PortPin,
    baud: u32,
) -> Result<UartSpec, ResolveError> {
    if !config.baud_allowed(baud) {
        return Err(ResolveError::InvalidBaud(baud));
    }
    if first == second {
        return Err(ResolveError::SamePin);
    }

    let a = profile
        .uart_pin(first)
        .ok_or(ResolveError::NotUartCapable(first))?;
    let b = profile
        .uart_pin(second)
        .ok_or(ResolveError::NotUartCapable(second))?;
    if a.uart != b.uart {
        return Err(ResolveError::UartInstanceMismatch);
    }

    let (rx, tx) = match (a.role, b.role) {
        (UartRole::Rx, UartRole::Tx) => (a, b),
        (UartRole::Tx, UartRole::Rx) => (b, a),
        _ => return Err(ResolveError::UartRoleMismatch),
    };
    let irq = profile
        .uart_irq(a.uart)
        .ok_or(ResolveError::NoUartIrq(a.uart))?;

    Ok(UartSpec {
        rx: rx.pin,
        tx: tx.pin,
        uart: a.uart,
        config: config.uart.with_baudrate(baud),
        rx_af: rx.af,
        tx_af: tx.af,
        irq,
    })
}
