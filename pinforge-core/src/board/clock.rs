//! Reference-counted clock gates
//!
//! Several peripherals can share one clock (two pins on port B, every
//! channel of ADC1). A clock is opened on its first reference and closed
//! when the last one goes. Entries are created on first use and never
//! removed, so shutdown can close them in reverse creation order.

use alloc::vec::Vec;

use pinforge_hal::{ClockControl, ClockId};

use super::{push_grow, INITIAL_CAPACITY};

/// One gateable clock and its users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clock {
    pub id: ClockId,
    pub enabled: bool,
    /// Number of live users
    pub refs: u16,
}

/// Growable set of clocks in creation order
#[derive(Debug)]
pub struct ClockSet {
    clocks: Vec<Clock>,
}

impl ClockSet {
    pub fn new() -> Self {
        Self {
            clocks: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    fn position(&self, id: ClockId) -> Option<usize> {
        self.clocks.iter().position(|clock| clock.id == id)
    }

    /// Take a reference, opening the gate if this is the first
    pub fn acquire<H: ClockControl>(&mut self, hal: &mut H, id: ClockId) {
        let index = match self.position(id) {
            Some(index) => index,
            None => {
                push_grow(
                    &mut self.clocks,
                    Clock {
                        id,
                        enabled: false,
                        refs: 0,
                    },
                );
                self.clocks.len() - 1
            }
        };

        let clock = &mut self.clocks[index];
        clock.refs = clock.refs.saturating_add(1);
        if !clock.enabled {
            hal.enable_clock(id);
            clock.enabled = true;
            debug!("clock {} on", id);
        }
    }

    /// Drop a reference, closing the gate if it was the last
    pub fn release<H: ClockControl>(&mut self, hal: &mut H, id: ClockId) {
        let Some(index) = self.position(id) else {
            warn!("release of unknown clock {}", id);
            return;
        };

        let clock = &mut self.clocks[index];
        clock.refs = clock.refs.saturating_sub(1);
        if clock.refs == 0 && clock.enabled {
            hal.disable_clock(id);
            clock.enabled = false;
            debug!("clock {} off", id);
        }
    }

    /// Look up a clock entry
    pub fn get(&self, id: ClockId) -> Option<&Clock> {
        self.clocks.iter().find(|clock| clock.id == id)
    }

    /// Check if a clock gate is open
    pub fn is_enabled(&self, id: ClockId) -> bool {
        self.get(id).is_some_and(|clock| clock.enabled)
    }

    /// Current users of a clock
    pub fn refs(&self, id: ClockId) -> u16 {
        self.get(id).map_or(0, |clock| clock.refs)
    }

    /// All entries in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Clock> {
        self.clocks.iter()
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.clocks.capacity()
    }

    /// Close every gate, newest first
    pub fn shutdown<H: ClockControl>(&mut self, hal: &mut H) {
        for clock in self.clocks.iter_mut().rev() {
            if clock.enabled {
                hal.disable_clock(clock.id);
                clock.enabled = false;
            }
            clock.refs = 0;
        }
    }
}

impl Default for ClockSet {
    fn default() -> Self {
        Self::new()
    }
}
