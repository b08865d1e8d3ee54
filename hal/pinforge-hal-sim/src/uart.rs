//! Simulated UART transceivers
//!
//! Transmitted bytes collect in a log; received bytes are injected by the
//! test and surface one at a time through the receive data register. A byte
//! injected while the register is still full sets the overrun flag.

use std::collections::VecDeque;

use pinforge_hal::{ClockId, UartConfig, UartControl, UartInstance};

use crate::{SimEvent, SimHal};

/// State of one simulated transceiver
#[derive(Debug, Clone, Default)]
pub struct SimUart {
    /// Last programmed framing
    pub config: Option<UartConfig>,
    /// Transceiver on
    pub enabled: bool,
    /// Receive interrupt enabled
    pub rx_interrupt: bool,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
    data: Option<u8>,
    overrun: bool,
}

impl SimUart {
    /// Bytes transmitted and not yet taken
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// Move the next pending byte into the data register
    fn shift_in(&mut self) {
        if let Some(byte) = self.rx.pop_front() {
            if self.data.is_some() {
                self.overrun = true;
            }
            self.data = Some(byte);
        }
    }
}

impl SimHal {
    /// Inspect a transceiver
    pub fn uart(&self, uart: UartInstance) -> Option<&SimUart> {
        self.uarts.get(&uart)
    }

    /// Queue bytes on the receive line
    ///
    /// The first byte lands in the data register immediately; the rest
    /// follow each time the register is read.
    pub fn inject_rx(&mut self, uart: UartInstance, bytes: &[u8]) {
        let state = self.uarts.entry(uart).or_default();
        state.rx.extend(bytes.iter().copied());
        if state.data.is_none() {
            state.shift_in();
        }
    }

    /// Deliver another byte while the data register is still full
    pub fn force_overrun(&mut self, uart: UartInstance, byte: u8) {
        let state = self.uarts.entry(uart).or_default();
        state.rx.push_front(byte);
        state.shift_in();
    }

    /// Drain the transmit log
    pub fn take_tx(&mut self, uart: UartInstance) -> Vec<u8> {
        self.uarts
            .get_mut(&uart)
            .map(|state| core::mem::take(&mut state.tx))
            .unwrap_or_default()
    }

    fn uart_mut(&mut self, uart: UartInstance, operation: &'static str) -> &mut SimUart {
        self.require_clock(ClockId::Uart(uart), operation);
        self.uarts.entry(uart).or_default()
    }
}

impl UartControl for SimHal {
    fn configure(&mut self, uart: UartInstance, config: &UartConfig) {
        self.uart_mut(uart, "uart configure").config = Some(*config);
    }

    fn enable(&mut self, uart: UartInstance) {
        self.uart_mut(uart, "uart enable").enabled = true;
        self.record(SimEvent::UartEnabled(uart));
    }

    fn disable(&mut self, uart: UartInstance) {
        self.uart_mut(uart, "uart disable").enabled = false;
        self.record(SimEvent::UartDisabled(uart));
    }

    fn enable_rx_interrupt(&mut self, uart: UartInstance) {
        self.uart_mut(uart, "uart rx interrupt").rx_interrupt = true;
    }

    fn disable_rx_interrupt(&mut self, uart: UartInstance) {
        self.uart_mut(uart, "uart rx interrupt").rx_interrupt = false;
    }

    fn write_byte(&mut self, uart: UartInstance, byte: u8) {
        self.uart_mut(uart, "uart write").tx.push(byte);
    }

    fn rx_ready(&self, uart: UartInstance) -> bool {
        self.uarts.get(&uart).is_some_and(|state| state.data.is_some())
    }

    fn overrun(&self, uart: UartInstance) -> bool {
        self.uarts.get(&uart).is_some_and(|state| state.overrun)
    }

    fn read_byte(&mut self, uart: UartInstance) -> u8 {
        let state = self.uart_mut(uart, "uart read");
        let byte = state.data.take().unwrap_or(0);
        state.overrun = false;
        state.shift_in();
        byte
    }
}
