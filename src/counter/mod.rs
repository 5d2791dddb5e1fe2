pub mod ready;
pub mod types;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::config::CounterConfig;
use crate::drivers::{GateInput, MicrosClock, PulseCounter};
use crate::types::{Changes, Error};

use ready::ReadyFlag;
use types::{Accumulator, CounterState, GateMode, Snapshot};

/// Raw value the period watchdog reports when no transitions arrived in time.
pub const NO_SIGNAL: u32 = 1;

/// The gated counting state machine.
///
/// Owns the counting hardware and all measurement state. Interrupt handlers
/// call [`on_gate_tick`](Self::on_gate_tick), [`on_rollover`](Self::on_rollover)
/// and [`on_edges`](Self::on_edges); foreground code selects the mode and takes
/// readings. Every access runs inside a critical section, so the
/// stop/capture/restart sequence is atomic and multi-byte values never tear.
///
/// The hardware is a singleton: construct exactly one of these.
pub struct GatedCounter<H, C, G> {
    state: Mutex<CriticalSectionRawMutex, RefCell<CounterState<H, C, G>>>,
    ready: ReadyFlag,
}

impl<H, C, G> GatedCounter<H, C, G> {
    /// Creates the counter in [`GateMode::Off`]. The hardware is not touched
    /// until the first mode change.
    pub const fn new(hw: H, clock: C, gate: G, config: CounterConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(CounterState {
                hw,
                clock,
                gate,
                config,
                mode: GateMode::Off,
                raw: 0,
                accumulator: Accumulator::Overflows(0),
                countdown: 0,
                prescale_init: 0,
                period_average: 0,
            })),
            ready: ReadyFlag::new(),
        }
    }

    /// Like [`new`](Self::new), but rejects a configuration that fails
    /// [`CounterConfig::verify`].
    pub fn try_new(hw: H, clock: C, gate: G, config: CounterConfig) -> Result<Self, Error> {
        Ok(Self::new(hw, clock, gate, config.verify()?))
    }
}

impl<H, C, G> GatedCounter<H, C, G>
where
    H: PulseCounter,
    C: MicrosClock,
    G: GateInput,
{
    /// Switches to `mode`, discarding any reading in flight.
    pub fn select(&self, mode: GateMode) -> GateMode {
        self.state.lock(|state| {
            let mut guard = state.borrow_mut();
            let st = &mut *guard;
            let previous = st.mode;

            st.mode = mode;
            st.prescale_init = mode.prescale_init(&st.config);
            st.period_average = mode.period_average().unwrap_or(0);
            st.accumulator = Accumulator::reset_for(mode);
            st.raw = 0;
            self.ready.lower();

            if previous.is_external() {
                st.gate.disarm();
            }
            st.hw.stop();
            st.hw.clear_pending();

            if mode.is_off() {
                st.hw.unlisten();
                st.countdown = 0;
            } else if mode.is_period() {
                // Timing edges, not counting an interval: clock right away and
                // let the watchdog run its full length.
                st.hw.preload(u32::from(st.period_average));
                st.hw.listen();
                st.hw.start();
                st.countdown = st.prescale_init;
            } else {
                // Clocking stays off. The first gate tick turns it on, so the
                // partial interval up to that tick never becomes a reading.
                st.hw.clear();
                st.hw.listen();
                if mode.is_external() {
                    st.gate.arm();
                    st.countdown = 0;
                } else {
                    st.countdown = 1;
                }
            }

            debug!(
                "gate mode {} -> {}, prescale {}",
                previous,
                mode,
                st.prescale_init
            );
        });
        // A waiter re-evaluates against the new mode.
        self.ready.notify();
        mode
    }

    /// Gate advance. Must be called every [`crate::config::GATE_TICK_MS`]
    /// milliseconds from an accurate time base; jitter here is measurement error.
    pub fn on_gate_tick(&self) {
        self.state.lock(|state| {
            let mut guard = state.borrow_mut();
            let st = &mut *guard;

            if st.countdown == 0 {
                return;
            }
            st.countdown -= 1;
            if st.countdown != 0 {
                return;
            }

            if st.mode.is_period() {
                // Watchdog: nothing qualifying arrived within the timeout.
                if !self.ready.is_raised() {
                    st.hw.preload(u32::from(st.period_average));
                    st.hw.clear_pending();
                    st.accumulator = Accumulator::AwaitingStart;
                    st.raw = NO_SIGNAL;
                    self.ready.raise();
                    trace!("period timeout");
                }
            } else {
                let (was_counting, raw) = capture(st);
                st.hw.clear();
                st.hw.start();

                st.raw = raw;
                st.accumulator = Accumulator::Overflows(0);
                if was_counting {
                    self.ready.raise();
                }
            }

            st.countdown = st.prescale_init;
        });
    }

    /// Hardware rollover interrupt.
    pub fn on_rollover(&self) {
        self.state.lock(|state| {
            let mut guard = state.borrow_mut();
            let st = &mut *guard;

            if st.mode.is_period() {
                let now = st.clock.now_micros();
                st.hw.preload(u32::from(st.period_average));
                if let Accumulator::Since(start) = st.accumulator {
                    st.raw = now.wrapping_sub(start);
                    self.ready.raise();
                }
                st.accumulator = Accumulator::Since(now);
                st.countdown = st.prescale_init;
            } else if let Accumulator::Overflows(overflows) = &mut st.accumulator {
                *overflows = overflows.wrapping_add(1);
            }
        });
    }

    /// Edge notifications for external-gate mode. Consumes the gate line's
    /// bits from `changes` and leaves every other line alone.
    pub fn on_edges(&self, changes: &mut Changes) {
        self.state.lock(|state| {
            let mut guard = state.borrow_mut();
            let st = &mut *guard;

            if !st.mode.is_external() {
                return;
            }
            let line = st.gate.line();

            if changes.fell.intersects(line) {
                st.hw.clear_pending();
                st.hw.clear();
                st.hw.start();
                st.accumulator = Accumulator::Overflows(0);
                changes.fell = changes.fell & !line;
            }
            if changes.rose.intersects(line) {
                let (was_counting, raw) = capture(st);
                st.raw = raw;
                st.accumulator = Accumulator::Overflows(0);
                // A rise with no fall before it closes a window we never opened.
                if was_counting {
                    self.ready.raise();
                }
                changes.rose = changes.rose & !line;
            }
        });
    }

    pub fn mode(&self) -> GateMode {
        self.state.lock(|state| state.borrow().mode)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_raised()
    }

    /// Resolves once a fresh reading is ready. Resolves at once in
    /// [`GateMode::Off`], where none will ever come.
    pub async fn wait_ready(&self) {
        self.ready.raised(|| self.mode().is_off()).await
    }

    /// Takes the current reading, lowering the ready flag. The raw value
    /// itself stays in place until the next gate completion or mode change.
    pub fn take(&self) -> Snapshot {
        self.state.lock(|state| {
            let st = state.borrow();
            Snapshot {
                raw: st.raw,
                fresh: self.ready.take(),
                mode: st.mode,
                prescale_init: st.prescale_init,
                period_average: st.period_average,
                input_prescaler: st.config.input_prescaler,
            }
        })
    }

    pub fn prescale_init(&self) -> u16 {
        self.state.lock(|state| state.borrow().prescale_init)
    }

    pub fn period_average(&self) -> Option<u8> {
        self.mode().period_average()
    }

    /// Runs `f` on the counting hardware inside the critical section.
    pub fn hardware<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        self.state.lock(|state| f(&mut state.borrow_mut().hw))
    }
}

/// Stops clocking and reads the extended count. A rollover that is latched
/// but not yet serviced belongs to this interval, so it is folded in here and
/// dropped from the interrupt controller.
fn capture<H: PulseCounter, C, G>(st: &mut CounterState<H, C, G>) -> (bool, u32) {
    let was_counting = st.hw.stop();
    if st.hw.clear_pending() {
        if let Accumulator::Overflows(overflows) = &mut st.accumulator {
            *overflows = overflows.wrapping_add(1);
        }
    }
    (was_counting, combine(st.accumulator, st.hw.count(), H::WIDTH))
}

/// Joins the software overflow count with the captured register value.
fn combine(accumulator: Accumulator, captured: u32, width: u32) -> u32 {
    let overflows = match accumulator {
        Accumulator::Overflows(overflows) => overflows,
        _ => 0,
    };
    ((u64::from(overflows) << width) + u64::from(captured)) as u32
}
