//! Host-side stand-ins for the counting hardware.

use core::cell::Cell;

use super::{width_mask, GateInput, MicrosClock, PulseCounter};
use crate::types::LineMask;

/// An 8-bit up-counter that behaves like an AVR timer clocked from its T0 pin.
#[derive(Debug, Default)]
pub struct SimCounter {
    pub value: u32,
    pub running: bool,
    pub listening: bool,
    pub pending: bool,
}

impl SimCounter {
    pub const fn new() -> Self {
        SimCounter {
            value: 0,
            running: false,
            listening: false,
            pending: false,
        }
    }

    /// One input edge. Returns true when it rolled the register over with the
    /// interrupt enabled, i.e. when the rollover handler must run.
    pub fn pulse(&mut self) -> bool {
        self.pulse_held();
        core::mem::take(&mut self.pending)
    }

    /// One input edge whose rollover interrupt stays latched: the handler is
    /// held off, e.g. by a critical section.
    pub fn pulse_held(&mut self) {
        if self.running {
            self.value = (self.value + 1) & width_mask(Self::WIDTH);
            if self.value == 0 && self.listening {
                self.pending = true;
            }
        }
    }
}

impl PulseCounter for SimCounter {
    const WIDTH: u32 = 8;

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) -> bool {
        core::mem::replace(&mut self.running, false)
    }

    fn count(&self) -> u32 {
        self.value
    }

    fn clear(&mut self) {
        self.value = 0;
    }

    fn preload(&mut self, pulses: u32) {
        self.value = 0u32.wrapping_sub(pulses) & width_mask(Self::WIDTH);
    }

    fn listen(&mut self) {
        self.listening = true;
    }

    fn unlisten(&mut self) {
        self.listening = false;
    }

    fn clear_pending(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }
}

/// Microsecond clock the test moves by hand.
pub struct SimClock<'a>(pub &'a Cell<u32>);

impl MicrosClock for SimClock<'_> {
    fn now_micros(&self) -> u32 {
        self.0.get()
    }
}

/// Gate line that only records whether the engine armed it.
pub struct SimGate<'a> {
    pub line: LineMask,
    pub armed: &'a Cell<bool>,
}

impl GateInput for SimGate<'_> {
    fn line(&self) -> LineMask {
        self.line
    }

    fn arm(&mut self) {
        self.armed.set(true);
    }

    fn disarm(&mut self) {
        self.armed.set(false);
    }
}
