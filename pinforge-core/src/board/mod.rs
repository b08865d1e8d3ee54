//! Peripheral resource manager
//!
//! The [`Board`] owns every live peripheral and the clocks behind them. It
//! enforces that at most one active peripheral claims a pin, that clocks
//! run exactly while something needs them, and that at most one UART feeds
//! the receive buffer.
//!
//! # Lifecycle
//!
//! ```text
//!            create_*                 destroy
//!   (free) ───────────▶ active ──────────────▶ (vacant entry)
//!                        │  ▲
//!           mutate_*     │  │  disable, reconfigure, enable
//!                        └──┘
//! ```
//!
//! The receive buffer is allocated by the caller and only borrowed here, so
//! growing the peripheral collection never moves memory the receive
//! interrupt is writing to.

mod clock;
mod peripheral;

pub use clock::{Clock, ClockSet};
pub use peripheral::{
    AdcChannel, Direction, GpioAction, GpioPin, Peripheral, PeripheralKind, UartPort,
    MAX_PERIPHERAL_CLOCKS,
};

use alloc::vec::Vec;
use core::mem;

use pinforge_hal::{
    AdcInstance, Hal, Irq, PortPin, Pull, SampleTime, UartConfig, UartInstance,
};

use crate::config::BoardProfile;
use crate::error::BoardError;
use crate::ring_buffer::RxBuffer;

/// Capacity of the peripheral and clock collections before first growth
pub const INITIAL_CAPACITY: usize = 4;

/// Next capacity of a full collection
fn grow_capacity(capacity: usize) -> usize {
    if capacity < 8 {
        8
    } else {
        capacity * 2
    }
}

/// Push with explicit geometric growth
pub(crate) fn push_grow<T>(vec: &mut Vec<T>, item: T) {
    if vec.len() == vec.capacity() {
        let target = grow_capacity(vec.capacity());
        vec.reserve_exact(target - vec.len());
    }
    vec.push(item);
}

/// Resolved analog channel request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcSpec {
    pub pin: PortPin,
    pub adc: AdcInstance,
    pub channel: u8,
    pub sample_time: SampleTime,
}

/// Resolved UART request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartSpec {
    pub rx: PortPin,
    pub tx: PortPin,
    pub uart: UartInstance,
    pub config: UartConfig,
    pub rx_af: u8,
    pub tx_af: u8,
    pub irq: Irq,
}

/// The active UART, as the interrupt glue needs to see it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartHandle {
    /// Index in the peripheral collection
    pub slot: usize,
    pub uart: UartInstance,
    pub irq: Irq,
}

/// Live registry of the board's peripherals and clocks
pub struct Board<'rx, H: Hal> {
    hal: H,
    profile: &'static BoardProfile,
    rx: &'rx RxBuffer,
    peripherals: Vec<Peripheral<'rx>>,
    clocks: ClockSet,
    uart: Option<UartHandle>,
}

impl<'rx, H: Hal> Board<'rx, H> {
    /// Take ownership of the hardware
    ///
    /// Clocks pinned by the profile are opened here and stay open until
    /// [`shutdown`](Self::shutdown).
    pub fn new(mut hal: H, profile: &'static BoardProfile, rx: &'rx RxBuffer) -> Self {
        let mut clocks = ClockSet::new();
        for &id in profile.pinned_clocks {
            clocks.acquire(&mut hal, id);
        }
        info!("board {=str} ready", profile.name);

        Self {
            hal,
            profile,
            rx,
            peripherals: Vec::with_capacity(INITIAL_CAPACITY),
            clocks,
            uart: None,
        }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn profile(&self) -> &'static BoardProfile {
        self.profile
    }

    pub fn clocks(&self) -> &ClockSet {
        &self.clocks
    }

    /// Active peripherals
    pub fn peripherals(&self) -> impl Iterator<Item = &Peripheral<'rx>> {
        self.peripherals.iter().filter(|p| p.is_active())
    }

    /// Number of entries the peripheral collection can hold without growing
    pub fn peripheral_capacity(&self) -> usize {
        self.peripherals.capacity()
    }

    /// The single active UART, if any
    pub fn active_uart(&self) -> Option<UartHandle> {
        self.uart
    }

    /// Index and kind of the active peripheral owning `pin`
    fn find(&self, pin: PortPin) -> Option<(usize, PeripheralKind)> {
        self.peripherals
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active() && p.claims(pin))
            .find_map(|(index, p)| p.kind().map(|kind| (index, kind)))
    }

    /// Active peripheral owning a pin
    pub fn peripheral(&self, pin: PortPin) -> Option<&Peripheral<'rx>> {
        self.find(pin).map(|(index, _)| &self.peripherals[index])
    }

    /// What a pin currently is
    pub fn query(&self, pin: PortPin) -> Option<PeripheralKind> {
        self.find(pin).map(|(_, kind)| kind)
    }

    /// Check that a pin exists on this board and is not the firmware's
    pub fn ensure_assignable(&self, pin: PortPin) -> Result<(), BoardError> {
        if !self.profile.has_port(pin.port) {
            return Err(BoardError::ClockUnavailable(pin.port));
        }
        if self.profile.is_reserved(pin) {
            return Err(BoardError::PinReserved(pin));
        }
        Ok(())
    }

    fn ensure_free(&self, pin: PortPin) -> Result<(), BoardError> {
        self.ensure_assignable(pin)?;
        match self.find(pin) {
            Some(_) => Err(BoardError::SlotOccupied(pin)),
            None => Ok(()),
        }
    }

    fn acquire_clocks(&mut self, peripheral: &Peripheral<'rx>) {
        for id in peripheral.clocks() {
            self.clocks.acquire(&mut self.hal, id);
        }
    }

    fn release_clocks(&mut self, peripheral: &Peripheral<'rx>) {
        for id in peripheral.clocks() {
            self.clocks.release(&mut self.hal, id);
        }
    }

    /// Clock, enable and store a new peripheral, reusing a free entry first
    fn install(&mut self, mut peripheral: Peripheral<'rx>) -> usize {
        self.acquire_clocks(&peripheral);
        peripheral.enable(&mut self.hal);

        match self.peripherals.iter().position(|p| !p.is_active()) {
            Some(index) => {
                self.peripherals[index] = peripheral;
                index
            }
            None => {
                push_grow(&mut self.peripherals, peripheral);
                self.peripherals.len() - 1
            }
        }
    }

    /// Disable the entry at `index` and leave it vacant
    ///
    /// Clocks are not released here so that an in-place replacement can
    /// take its references before the old ones go.
    fn retire(&mut self, index: usize) -> Peripheral<'rx> {
        let mut old = mem::replace(&mut self.peripherals[index], Peripheral::Vacant);
        old.disable(&mut self.hal);

        if let Peripheral::Adc(channel) = &old {
            if !self.adc_in_use(channel.adc) {
                self.hal.power_off(channel.adc);
            }
        }
        if self.uart.is_some_and(|handle| handle.slot == index) {
            self.uart = None;
        }
        old
    }

    fn adc_in_use(&self, adc: AdcInstance) -> bool {
        self.peripherals
            .iter()
            .any(|p| matches!(p, Peripheral::Adc(ch) if ch.enabled && ch.adc == adc))
    }

    /// Index of the active peripheral on `pin`, checked against `accept`
    fn find_as(
        &self,
        pin: PortPin,
        accept: impl Fn(&Peripheral<'rx>) -> bool,
    ) -> Result<usize, BoardError> {
        let (index, found) = self.find(pin).ok_or(BoardError::NotConfigured(pin))?;
        if accept(&self.peripherals[index]) {
            Ok(index)
        } else {
            Err(BoardError::WrongPeripheral { pin, found })
        }
    }

    /// Create a digital input or output on a free pin
    pub fn create_gpio(
        &mut self,
        pin: PortPin,
        direction: Direction,
        pull: Pull,
    ) -> Result<(), BoardError> {
        self.ensure_free(pin)?;
        self.install(Peripheral::Gpio(GpioPin::new(pin, direction, pull)));
        info!("{} is now gpio {}", pin, direction);
        Ok(())
    }

    /// Create an analog input on a free pin
    pub fn create_adc(&mut self, spec: AdcSpec) -> Result<(), BoardError> {
        self.ensure_free(spec.pin)?;
        self.install(Peripheral::Adc(adc_channel(spec)));
        info!("{} is now adc channel {}", spec.pin, spec.channel);
        Ok(())
    }

    /// Create the UART on two free pins
    pub fn create_uart(&mut self, spec: UartSpec) -> Result<(), BoardError> {
        if let Some(active) = self.uart {
            return Err(BoardError::UartBusy(active.uart));
        }
        self.ensure_free(spec.rx)?;
        self.ensure_free(spec.tx)?;

        let slot = self.install(Peripheral::Uart(UartPort {
            rx: spec.rx,
            tx: spec.tx,
            uart: spec.uart,
            config: spec.config,
            rx_af: spec.rx_af,
            tx_af: spec.tx_af,
            irq: spec.irq,
            buffer: self.rx,
            enabled: false,
        }));
        self.uart = Some(UartHandle {
            slot,
            uart: spec.uart,
            irq: spec.irq,
        });
        info!("{} on rx {} tx {}", spec.uart, spec.rx, spec.tx);
        Ok(())
    }

    /// Reconfigure a digital pin in place
    ///
    /// Returns `false` without touching the hardware when nothing changes.
    pub fn mutate_gpio(
        &mut self,
        pin: PortPin,
        direction: Direction,
        pull: Pull,
    ) -> Result<bool, BoardError> {
        let index = self.find_as(pin, |p| matches!(p, Peripheral::Gpio(_)))?;
        let Peripheral::Gpio(gpio) = &self.peripherals[index] else {
            return Err(BoardError::NotConfigured(pin));
        };
        if gpio.direction == direction && gpio.pull == pull {
            return Ok(false);
        }

        let mut entry = Peripheral::Gpio(GpioPin::new(pin, direction, pull));
        self.peripherals[index].disable(&mut self.hal);
        entry.enable(&mut self.hal);
        self.peripherals[index] = entry;
        info!("{} changed to gpio {}", pin, direction);
        Ok(true)
    }

    /// Reprogram an analog input in place
    ///
    /// Returns `false` without touching the hardware when nothing changes.
    pub fn mutate_adc(&mut self, spec: AdcSpec) -> Result<bool, BoardError> {
        let index = self.find_as(spec.pin, |p| matches!(p, Peripheral::Adc(_)))?;
        let Peripheral::Adc(current) = self.peripherals[index] else {
            return Err(BoardError::NotConfigured(spec.pin));
        };
        if current.adc == spec.adc
            && current.channel == spec.channel
            && current.sample_time == spec.sample_time
        {
            return Ok(false);
        }

        self.replace(index, Peripheral::Adc(adc_channel(spec)));
        info!("{} adc reprogrammed", spec.pin);
        Ok(true)
    }

    /// Replace an analog input with a digital pin
    pub fn mutate_adc_to_gpio(
        &mut self,
        pin: PortPin,
        direction: Direction,
        pull: Pull,
    ) -> Result<(), BoardError> {
        let index = self.find_as(pin, |p| matches!(p, Peripheral::Adc(_)))?;
        self.replace(index, Peripheral::Gpio(GpioPin::new(pin, direction, pull)));
        info!("{} changed from adc to gpio {}", pin, direction);
        Ok(())
    }

    /// Replace a digital pin with an analog input
    pub fn mutate_gpio_to_adc(&mut self, spec: AdcSpec) -> Result<(), BoardError> {
        let index = self.find_as(spec.pin, |p| matches!(p, Peripheral::Gpio(_)))?;
        self.replace(index, Peripheral::Adc(adc_channel(spec)));
        info!("{} changed from gpio to adc", spec.pin);
        Ok(())
    }

    /// Swap the entry at `index` for another family in place
    fn replace(&mut self, index: usize, mut entry: Peripheral<'rx>) {
        let old = self.retire(index);
        self.acquire_clocks(&entry);
        entry.enable(&mut self.hal);
        self.peripherals[index] = entry;
        self.release_clocks(&old);
    }

    /// Tear down whatever owns `pin`
    ///
    /// A UART goes as a unit, freeing both its pins.
    pub fn destroy(&mut self, pin: PortPin) -> Result<PeripheralKind, BoardError> {
        let (index, kind) = self.find(pin).ok_or(BoardError::NotConfigured(pin))?;
        let old = self.retire(index);
        self.release_clocks(&old);
        info!("{} released ({})", pin, kind);
        Ok(kind)
    }

    /// Tear down the active UART, wherever it is
    pub fn destroy_uart(&mut self) -> Result<UartHandle, BoardError> {
        let handle = self.uart.ok_or(BoardError::NoUart)?;
        let old = self.retire(handle.slot);
        self.release_clocks(&old);
        info!("{} released", handle.uart);
        Ok(handle)
    }

    /// Drive or sample a digital pin
    ///
    /// Returns the level for [`GpioAction::Read`] and `None` otherwise.
    pub fn act_gpio(&mut self, pin: PortPin, action: GpioAction) -> Result<Option<bool>, BoardError> {
        let index = self.find_as(pin, |p| matches!(p, Peripheral::Gpio(_)))?;
        let Peripheral::Gpio(gpio) = &self.peripherals[index] else {
            return Err(BoardError::NotConfigured(pin));
        };

        match (action, gpio.direction) {
            (GpioAction::Read, Direction::Input) => return Ok(Some(self.hal.is_high(pin))),
            (GpioAction::Read, Direction::Output) => return Err(BoardError::NotInput(pin)),
            (_, Direction::Input) => return Err(BoardError::NotOutput(pin)),
            (GpioAction::Set, Direction::Output) => self.hal.set_high(pin),
            (GpioAction::Clear, Direction::Output) => self.hal.set_low(pin),
            (GpioAction::Toggle, Direction::Output) => self.hal.toggle(pin),
        }
        Ok(None)
    }

    /// Run one blocking conversion on an analog input
    pub fn act_adc(&mut self, pin: PortPin) -> Result<u16, BoardError> {
        let index = self.find_as(pin, |p| matches!(p, Peripheral::Adc(_)))?;
        let Peripheral::Adc(channel) = self.peripherals[index] else {
            return Err(BoardError::NotConfigured(pin));
        };
        Ok(self.hal.convert_blocking(channel.adc, channel.channel))
    }

    /// Drain received bytes into `buf`
    pub fn uart_read(&mut self, buf: &mut [u8]) -> Result<usize, BoardError> {
        if self.uart.is_none() {
            return Err(BoardError::NoUart);
        }

        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    /// Transmit bytes, blocking until all are sent
    pub fn uart_write(&mut self, data: &[u8]) -> Result<usize, BoardError> {
        let handle = self.uart.ok_or(BoardError::NoUart)?;
        self.hal.write_blocking(handle.uart, data);
        Ok(data.len())
    }

    /// Disable every peripheral, then every clock newest first
    pub fn shutdown(mut self) -> H {
        for index in 0..self.peripherals.len() {
            if self.peripherals[index].is_active() {
                self.retire(index);
            }
        }
        self.clocks.shutdown(&mut self.hal);
        info!("board shut down");
        self.hal
    }
}

fn adc_channel(spec: AdcSpec) -> AdcChannel {
    AdcChannel {
        pin: spec.pin,
        adc: spec.adc,
        channel: spec.channel,
        sample_time: spec.sample_time,
        enabled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STM32F411RE;
    use pinforge_hal::{ClockId, PinMode, Port};
    use pinforge_hal_sim::{SimEvent, SimHal};

    const A0: PortPin = PortPin::new(Port::A, 0);
    const A1: PortPin = PortPin::new(Port::A, 1);
    const A9: PortPin = PortPin::new(Port::A, 9);
    const A10: PortPin = PortPin::new(Port::A, 10);
    const B4: PortPin = PortPin::new(Port::B, 4);
    const ADC1: ClockId = ClockId::Adc(AdcInstance::Adc1);

    fn adc_spec(pin: PortPin, channel: u8) -> AdcSpec {
        AdcSpec {
            pin,
            adc: AdcInstance::Adc1,
            channel,
            sample_time: SampleTime::Cycles56,
        }
    }

    fn usart1() -> UartSpec {
        UartSpec {
            rx: A10,
            tx: A9,
            uart: UartInstance::Usart1,
            config: UartConfig::default(),
            rx_af: 7,
            tx_af: 7,
            irq: Irq(37),
        }
    }

    #[test]
    fn test_pinned_clock_on_from_start() {
        let rx = RxBuffer::new();
        let board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        assert!(board.hal().clock_enabled(ClockId::Gpio(Port::A)));
        assert_eq!(board.clocks().refs(ClockId::Gpio(Port::A)), 1);
    }

    #[test]
    fn test_create_gpio_claims_pin_and_clock() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);

        board.create_gpio(B4, Direction::Output, Pull::None).unwrap();
        assert_eq!(board.query(B4), Some(PeripheralKind::GpioOutput));
        assert!(board.hal().clock_enabled(ClockId::Gpio(Port::B)));
        assert_eq!(board.hal().pin(B4).mode, PinMode::Output);
        assert_eq!(
            board.create_gpio(B4, Direction::Input, Pull::Up),
            Err(BoardError::SlotOccupied(B4))
        );
        assert!(board.hal().violations().is_empty());
    }

    #[test]
    fn test_reserved_and_foreign_pins_rejected() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);

        let console = PortPin::new(Port::A, 2);
        assert_eq!(
            board.create_gpio(console, Direction::Output, Pull::None),
            Err(BoardError::PinReserved(console))
        );
        let h0 = PortPin::new(Port::H, 0);
        assert_eq!(
            board.create_gpio(h0, Direction::Output, Pull::None),
            Err(BoardError::ClockUnavailable(Port::H))
        );
        assert_eq!(board.peripherals().count(), 0);
    }

    #[test]
    fn test_mutate_gpio_noop_when_unchanged() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_gpio(A0, Direction::Output, Pull::None).unwrap();
        board.hal_mut().clear_events();

        assert_eq!(board.mutate_gpio(A0, Direction::Output, Pull::None), Ok(false));
        assert!(board.hal().events().is_empty());

        assert_eq!(board.mutate_gpio(A0, Direction::Input, Pull::Down), Ok(true));
        assert_eq!(board.query(A0), Some(PeripheralKind::GpioInput));
        assert_eq!(board.hal().pin(A0).pull, Pull::Down);
        assert_eq!(board.peripherals().count(), 1);
    }

    #[test]
    fn test_adc_to_gpio_releases_converter() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_adc(adc_spec(A0, 0)).unwrap();
        assert!(board.hal().adc_powered(AdcInstance::Adc1));

        board.mutate_adc_to_gpio(A0, Direction::Output, Pull::None).unwrap();
        assert_eq!(board.query(A0), Some(PeripheralKind::GpioOutput));
        assert!(!board.hal().adc_powered(AdcInstance::Adc1));
        assert!(!board.hal().clock_enabled(ADC1));
        assert!(board.hal().violations().is_empty());
    }

    #[test]
    fn test_adc_clock_kept_for_other_channel() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_adc(adc_spec(A0, 0)).unwrap();
        board.create_adc(adc_spec(A1, 1)).unwrap();

        board.mutate_adc_to_gpio(A0, Direction::Input, Pull::None).unwrap();
        assert!(board.hal().clock_enabled(ADC1));
        assert!(board.hal().adc_powered(AdcInstance::Adc1));
        assert_eq!(board.clocks().refs(ADC1), 1);
    }

    #[test]
    fn test_gpio_to_adc_conversion() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_gpio(A1, Direction::Input, Pull::Up).unwrap();
        board.mutate_gpio_to_adc(adc_spec(A1, 1)).unwrap();
        board.hal_mut().set_adc_sample(AdcInstance::Adc1, 1, 1234);

        assert_eq!(board.query(A1), Some(PeripheralKind::Adc));
        assert_eq!(board.hal().pin(A1).mode, PinMode::Analog);
        assert_eq!(board.act_adc(A1), Ok(1234));
    }

    #[test]
    fn test_act_gpio_direction_checks() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_gpio(A0, Direction::Output, Pull::None).unwrap();
        board.create_gpio(A1, Direction::Input, Pull::Up).unwrap();

        assert_eq!(board.act_gpio(A0, GpioAction::Set), Ok(None));
        assert!(board.hal().pin(A0).latch);
        assert_eq!(board.act_gpio(A0, GpioAction::Toggle), Ok(None));
        assert!(!board.hal().pin(A0).latch);
        assert_eq!(board.act_gpio(A0, GpioAction::Read), Err(BoardError::NotInput(A0)));
        assert_eq!(board.act_gpio(A1, GpioAction::Set), Err(BoardError::NotOutput(A1)));
        assert_eq!(board.act_gpio(A1, GpioAction::Read), Ok(Some(true)));
        assert_eq!(board.act_gpio(B4, GpioAction::Set), Err(BoardError::NotConfigured(B4)));
    }

    #[test]
    fn test_act_on_wrong_family() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_adc(adc_spec(A0, 0)).unwrap();

        assert_eq!(
            board.act_gpio(A0, GpioAction::Set),
            Err(BoardError::WrongPeripheral {
                pin: A0,
                found: PeripheralKind::Adc
            })
        );
    }

    #[test]
    fn test_errors_and_destroy_name_the_owner() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_gpio(B4, Direction::Output, Pull::None).unwrap();
        board.create_uart(usart1()).unwrap();

        assert_eq!(
            board.act_adc(B4),
            Err(BoardError::WrongPeripheral {
                pin: B4,
                found: PeripheralKind::GpioOutput
            })
        );
        assert_eq!(
            board.act_gpio(A10, GpioAction::Read),
            Err(BoardError::WrongPeripheral {
                pin: A10,
                found: PeripheralKind::Uart
            })
        );
        assert_eq!(board.destroy(B4), Ok(PeripheralKind::GpioOutput));
        assert_eq!(board.destroy(A10), Ok(PeripheralKind::Uart));
        assert_eq!(board.destroy(B4), Err(BoardError::NotConfigured(B4)));
    }

    #[test]
    fn test_uart_lifecycle() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_uart(usart1()).unwrap();

        assert_eq!(board.query(A9), Some(PeripheralKind::Uart));
        assert_eq!(board.query(A10), Some(PeripheralKind::Uart));
        assert!(board.hal().irq_enabled(Irq(37)));
        assert_eq!(board.hal().pin(A9).mode, PinMode::Alternate(7));
        assert_eq!(board.active_uart().map(|h| h.uart), Some(UartInstance::Usart1));
        assert_eq!(
            board.create_uart(usart1()),
            Err(BoardError::UartBusy(UartInstance::Usart1))
        );

        assert_eq!(board.uart_write(b"ok"), Ok(2));
        assert_eq!(board.hal_mut().take_tx(UartInstance::Usart1), b"ok");

        assert_eq!(board.destroy(A9), Ok(PeripheralKind::Uart));
        assert_eq!(board.query(A10), None);
        assert_eq!(board.active_uart(), None);
        assert!(!board.hal().irq_enabled(Irq(37)));
        assert!(!board.hal().clock_enabled(ClockId::Uart(UartInstance::Usart1)));
        // Console port clock is pinned
        assert!(board.hal().clock_enabled(ClockId::Gpio(Port::A)));
        assert!(board.hal().violations().is_empty());
    }

    #[test]
    fn test_uart_read_drains_buffer() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        let mut buf = [0u8; 4];
        assert_eq!(board.uart_read(&mut buf), Err(BoardError::NoUart));

        board.create_uart(usart1()).unwrap();
        for byte in b"hello" {
            rx.push(*byte);
        }
        assert_eq!(board.uart_read(&mut buf), Ok(4));
        assert_eq!(&buf, b"hell");
        assert_eq!(board.uart_read(&mut buf), Ok(1));
        assert_eq!(buf[0], b'o');
        assert_eq!(board.uart_read(&mut buf), Ok(0));
    }

    #[test]
    fn test_vacant_entries_reused_before_growth() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        for pin in 0..4 {
            board
                .create_gpio(PortPin::new(Port::B, pin), Direction::Output, Pull::None)
                .unwrap();
        }
        let capacity = board.peripheral_capacity();

        board.destroy(PortPin::new(Port::B, 1)).unwrap();
        board.create_gpio(B4, Direction::Output, Pull::None).unwrap();
        assert_eq!(board.peripheral_capacity(), capacity);

        for pin in 5..10 {
            board
                .create_gpio(PortPin::new(Port::B, pin), Direction::Output, Pull::None)
                .unwrap();
        }
        assert_eq!(board.peripherals().count(), 9);
        assert!(board.peripheral_capacity() >= 9);
    }

    #[test]
    fn test_shutdown_order() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_gpio(B4, Direction::Output, Pull::None).unwrap();
        board.create_adc(adc_spec(A0, 0)).unwrap();
        board.hal_mut().clear_events();

        let hal = board.shutdown();
        let disabled: std::vec::Vec<_> = hal
            .events()
            .iter()
            .filter_map(|event| match event {
                SimEvent::ClockDisabled(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(disabled, [ADC1, ClockId::Gpio(Port::B), ClockId::Gpio(Port::A)]);
        assert!(hal.enabled_clocks().is_empty());
        assert!(hal.violations().is_empty());
    }

    #[test]
    fn test_mutate_adc_sample_time() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        board.create_adc(adc_spec(A0, 0)).unwrap();
        assert_eq!(board.mutate_adc(adc_spec(A0, 0)), Ok(false));

        let slow = AdcSpec {
            sample_time: SampleTime::Cycles480,
            ..adc_spec(A0, 0)
        };
        assert_eq!(board.mutate_adc(slow), Ok(true));
        let channel = board.hal().adc(AdcInstance::Adc1).map(|adc| adc.channels[&0]);
        assert_eq!(channel, Some(SampleTime::Cycles480));
        assert!(board.hal().adc_powered(AdcInstance::Adc1));
        assert_eq!(board.clocks().refs(ADC1), 1);
    }

    #[test]
    fn test_destroy_uart_without_uart() {
        let rx = RxBuffer::new();
        let mut board = Board::new(SimHal::new(), &STM32F411RE, &rx);
        assert_eq!(board.destroy_uart(), Err(BoardError::NoUart));

        board.create_uart(usart1()).unwrap();
        assert_eq!(board.destroy_uart().map(|h| h.uart), Ok(UartInstance::Usart1));
        assert_eq!(board.peripherals().count(), 0);
    }

    #[test]
    fn test_grow_capacity() {
        assert_eq!(grow_capacity(0), 8);
        assert_eq!(grow_capacity(4), 8);
        assert_eq!(grow_capacity(8), 16);
        assert_eq!(grow_capacity(16), 32);
    }
}
