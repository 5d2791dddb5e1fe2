//! nRF52832 binding of the counting hardware.

pub mod types;

use embassy_nrf::{
    gpio::{AnyPin, Input, Pull},
    gpiote::{AnyChannel, InputChannel, InputChannelPolarity},
    interrupt::{self, InterruptExt},
    pac,
    peripherals::{TIMER1, TIMER2, TIMER3},
    ppi::{AnyConfigurableChannel, Ppi, Task},
};

use super::{width_mask, MicrosClock, PulseCounter};
use crate::systimer::TICK_MS;
use crate::types::LineMask;

pub use types::{NrfMicros, NrfPulseCounter, PulseInput};

/// 16 MHz / 2^4.
const PRESCALER_1MHZ: u8 = 4;

fn counter_regs() -> &'static pac::timer0::RegisterBlock {
    unsafe { &*pac::TIMER1::ptr() }
}

fn micros_regs() -> &'static pac::timer0::RegisterBlock {
    unsafe { &*pac::TIMER2::ptr() }
}

/// Sets TIMER1 up as the pulse counter and routes `pin` into it. The counter
/// stays stopped until the engine selects a mode. Returns the routing, which
/// must outlive the measurement.
pub fn configure_pulse_input<'a>(
    _timer: TIMER1,
    pin: AnyPin,
    gpiote_ch: AnyChannel,
    ppi_ch: AnyConfigurableChannel,
) -> PulseInput<'a> {
    let r = counter_regs();
    r.tasks_stop.write(|w| unsafe { w.bits(1) });
    r.mode.write(|w| w.mode().counter());
    r.bitmode.write(|w| w.bitmode()._32bit());
    r.shorts.write(|w| w.compare0_clear().enabled());
    r.intenclr.write(|w| unsafe { w.bits(u32::MAX) });
    r.cc[0].write(|w| unsafe { w.bits(1 << NrfPulseCounter::WIDTH) });
    r.tasks_clear.write(|w| unsafe { w.bits(1) });
    r.events_compare[0].reset();

    interrupt::TIMER1.set_priority(interrupt::Priority::P1);
    interrupt::TIMER1.unpend();
    unsafe { interrupt::TIMER1.enable() };

    let input = Input::new(pin, Pull::None);
    let gpiote_ch = InputChannel::new(gpiote_ch, input, InputChannelPolarity::LoToHi);
    let mut ppi_ch = Ppi::new_one_to_one(ppi_ch, gpiote_ch.event_in(), Task::from_reg(&r.tasks_count));
    ppi_ch.enable();

    debug!("pulse counter on TIMER1, {}-bit rollover", NrfPulseCounter::WIDTH);
    PulseInput { ppi_ch, gpiote_ch }
}

/// Rollover interrupt acknowledge. Call first thing in the TIMER1 handler.
pub fn acknowledge_rollover() {
    counter_regs().events_compare[0].reset();
}

/// Starts TIMER2 as the microsecond clock.
pub fn configure_micros(_timer: TIMER2) {
    let r = micros_regs();
    r.tasks_stop.write(|w| unsafe { w.bits(1) });
    r.mode.write(|w| w.mode().timer());
    r.bitmode.write(|w| w.bitmode()._32bit());
    r.prescaler.write(|w| unsafe { w.prescaler().bits(PRESCALER_1MHZ) });
    r.tasks_clear.write(|w| unsafe { w.bits(1) });
    r.tasks_start.write(|w| unsafe { w.bits(1) });
}

/// Starts TIMER3 interrupting every [`TICK_MS`] milliseconds.
pub fn configure_systick(_timer: TIMER3) {
    let r = unsafe { &*pac::TIMER3::ptr() };
    r.tasks_stop.write(|w| unsafe { w.bits(1) });
    r.mode.write(|w| w.mode().timer());
    r.bitmode.write(|w| w.bitmode()._32bit());
    r.prescaler.write(|w| unsafe { w.prescaler().bits(PRESCALER_1MHZ) });
    r.cc[0].write(|w| unsafe { w.bits(TICK_MS * 1000) });
    r.shorts.write(|w| w.compare0_clear().enabled());
    r.events_compare[0].reset();
    r.intenset.write(|w| w.compare0().set());

    interrupt::TIMER3.set_priority(interrupt::Priority::P1);
    interrupt::TIMER3.unpend();
    unsafe { interrupt::TIMER3.enable() };

    r.tasks_clear.write(|w| unsafe { w.bits(1) });
    r.tasks_start.write(|w| unsafe { w.bits(1) });
}

/// Call first thing in the TIMER3 handler.
pub fn acknowledge_systick() {
    let r = unsafe { &*pac::TIMER3::ptr() };
    r.events_compare[0].reset();
}

/// Input levels of every P0 pin, bit n for P0.n.
pub fn port_levels() -> LineMask {
    let p0 = unsafe { &*pac::P0::ptr() };
    LineMask(p0.in_.read().bits())
}

impl NrfPulseCounter {
    pub const fn new() -> Self {
        Self { running: false }
    }

    fn rollover_after(&self, pulses: u32) {
        let r = counter_regs();
        r.cc[0].write(|w| unsafe { w.bits(pulses.max(1)) });
        r.tasks_clear.write(|w| unsafe { w.bits(1) });
    }
}

impl Default for NrfPulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCounter for NrfPulseCounter {
    const WIDTH: u32 = 8;

    fn start(&mut self) {
        counter_regs().tasks_start.write(|w| unsafe { w.bits(1) });
        self.running = true;
    }

    fn stop(&mut self) -> bool {
        counter_regs().tasks_stop.write(|w| unsafe { w.bits(1) });
        core::mem::replace(&mut self.running, false)
    }

    fn count(&self) -> u32 {
        let r = counter_regs();
        r.tasks_capture[1].write(|w| unsafe { w.bits(1) });
        r.cc[1].read().bits() & width_mask(Self::WIDTH)
    }

    fn clear(&mut self) {
        self.rollover_after(1 << Self::WIDTH);
    }

    fn preload(&mut self, pulses: u32) {
        self.rollover_after(pulses);
    }

    fn listen(&mut self) {
        counter_regs().intenset.write(|w| w.compare0().set());
    }

    fn unlisten(&mut self) {
        counter_regs().intenclr.write(|w| w.compare0().clear());
    }

    fn clear_pending(&mut self) -> bool {
        let r = counter_regs();
        let latched = r.events_compare[0].read().bits() != 0;
        r.events_compare[0].reset();
        interrupt::TIMER1.unpend();
        latched
    }
}

impl MicrosClock for NrfMicros {
    fn now_micros(&self) -> u32 {
        let r = micros_regs();
        r.tasks_capture[0].write(|w| unsafe { w.bits(1) });
        r.cc[0].read().bits()
    }
}
