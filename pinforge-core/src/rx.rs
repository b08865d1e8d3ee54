//! UART receive interrupt service
//!
//! Platform glue calls [`service_uart_rx`] from the interrupt handler of
//! the instance reported by [`Board::active_uart`](crate::board::Board::active_uart).
//! This is the only producer of the receive buffer.

use pinforge_hal::{UartControl, UartInstance};

use crate::ring_buffer::RingBuffer;

/// Outcome of one interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// Spurious interrupt, nothing received
    Idle,
    /// Byte queued
    Stored(u8),
    /// Buffer full, byte lost
    Dropped(u8),
}

/// Move one received byte from the data register into `buffer`
///
/// Fires on receive-ready or overrun; reading the data register clears
/// both flags.
pub fn service_uart_rx<H, const N: usize>(
    hal: &mut H,
    uart: UartInstance,
    buffer: &RingBuffer<N>,
) -> RxEvent
where
    H: UartControl + ?Sized,
{
    if !hal.rx_ready(uart) && !hal.overrun(uart) {
        return RxEvent::Idle;
    }

    let byte = hal.read_byte(uart);
    if buffer.push(byte) {
        RxEvent::Stored(byte)
    } else {
        warn!("{} rx buffer full, dropped {=u8:#x}", uart, byte);
        RxEvent::Dropped(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinforge_hal::{ClockControl, ClockId};
    use pinforge_hal_sim::SimHal;

    const UART: UartInstance = UartInstance::Usart6;

    fn powered() -> SimHal {
        let mut hal = SimHal::new();
        hal.enable_clock(ClockId::Uart(UART));
        hal
    }

    #[test]
    fn test_idle_without_data() {
        let mut hal = powered();
        let ring = RingBuffer::<8>::new();
        assert_eq!(service_uart_rx(&mut hal, UART, &ring), RxEvent::Idle);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_bytes_queued_in_order() {
        let mut hal = powered();
        let ring = RingBuffer::<8>::new();
        hal.inject_rx(UART, b"ab");

        assert_eq!(service_uart_rx(&mut hal, UART, &ring), RxEvent::Stored(b'a'));
        assert_eq!(service_uart_rx(&mut hal, UART, &ring), RxEvent::Stored(b'b'));
        assert_eq!(service_uart_rx(&mut hal, UART, &ring), RxEvent::Idle);
        assert_eq!(ring.pop(), Some(b'a'));
        assert_eq!(ring.pop(), Some(b'b'));
    }

    #[test]
    fn test_full_buffer_drops() {
        let mut hal = powered();
        let ring = RingBuffer::<2>::new();
        hal.inject_rx(UART, b"xy");

        assert_eq!(service_uart_rx(&mut hal, UART, &ring), RxEvent::Stored(b'x'));
        assert_eq!(service_uart_rx(&mut hal, UART, &ring), RxEvent::Dropped(b'y'));
        assert!(!hal.rx_ready(UART));
        assert!(hal.violations().is_empty());
    }

    #[test]
    fn test_overrun_is_serviced() {
        let mut hal = powered();
        let ring = RingBuffer::<8>::new();
        hal.inject_rx(UART, b"p");
        hal.force_overrun(UART, b'q');

        assert_eq!(service_uart_rx(&mut hal, UART, &ring), RxEvent::Stored(b'q'));
        assert!(!hal.overrun(UART));
    }
}
