//! Millisecond system timer. A hardware timer interrupt calls
//! [`SysTimer::on_interrupt`] once per millisecond; the installed hook runs
//! from that same interrupt.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Interrupt period.
pub const TICK_MS: u32 = 1;

fn no_hook() {}

pub struct SysTimer {
    millis: AtomicU32,
    hook: Mutex<CriticalSectionRawMutex, Cell<fn()>>,
}

impl SysTimer {
    pub const fn new() -> Self {
        Self {
            millis: AtomicU32::new(0),
            hook: Mutex::new(Cell::new(no_hook as fn())),
        }
    }

    /// Installs the per-tick hook, replacing the previous one.
    pub fn set_hook(&self, hook: fn()) {
        self.hook.lock(|cell| cell.set(hook));
    }

    pub fn clear_hook(&self) {
        self.set_hook(no_hook);
    }

    /// Timer interrupt body.
    pub fn on_interrupt(&self) {
        self.millis.fetch_add(TICK_MS, Ordering::Relaxed);
        let hook = self.hook.lock(Cell::get);
        hook();
    }

    /// Milliseconds since start. Wraps after about 49.7 days.
    pub fn millis(&self) -> u32 {
        self.millis.load(Ordering::Relaxed)
    }
}

impl Default for SysTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fires on every `divisor`-th call to [`tick`](Self::tick).
pub struct TickDivider {
    divisor: u8,
    remaining: AtomicU8,
}

impl TickDivider {
    /// `divisor` of 0 is treated as 1.
    pub const fn new(divisor: u8) -> Self {
        let divisor = if divisor == 0 { 1 } else { divisor };
        Self {
            divisor,
            remaining: AtomicU8::new(divisor),
        }
    }

    /// Milliseconds to gate ticks: fires every [`crate::config::GATE_TICK_MS`] ticks.
    pub const fn gate() -> Self {
        Self::new((crate::config::GATE_TICK_MS / TICK_MS) as u8)
    }

    /// Counts one tick. Returns true when the divided tick is due.
    pub fn tick(&self) -> bool {
        let left = self.remaining.load(Ordering::Relaxed) - 1;
        if left == 0 {
            self.remaining.store(self.divisor, Ordering::Relaxed);
            true
        } else {
            self.remaining.store(left, Ordering::Relaxed);
            false
        }
    }

    pub fn reset(&self) {
        self.remaining.store(self.divisor, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_milliseconds() {
        let timer = SysTimer::new();
        for _ in 0..25 {
            timer.on_interrupt();
        }
        assert_eq!(timer.millis(), 25);
    }

    #[test]
    fn runs_the_installed_hook() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        fn count() {
            CALLS.fetch_add(1, Ordering::Relaxed);
        }

        let timer = SysTimer::new();
        timer.on_interrupt();
        timer.set_hook(count);
        timer.on_interrupt();
        timer.on_interrupt();
        timer.clear_hook();
        timer.on_interrupt();
        assert_eq!(CALLS.load(Ordering::Relaxed), 2);
        assert_eq!(timer.millis(), 4);
    }

    #[test]
    fn gate_divider_fires_every_ten_ticks() {
        let divider = TickDivider::gate();
        let due: heapless::Vec<usize, 8> = (1..=35usize).filter(|_| divider.tick()).collect();
        assert_eq!(due.as_slice(), &[10, 20, 30]);
    }

    #[test]
    fn reset_restarts_the_division() {
        let divider = TickDivider::new(3);
        assert!(!divider.tick());
        assert!(!divider.tick());
        divider.reset();
        assert!(!divider.tick());
        assert!(!divider.tick());
        assert!(divider.tick());
        assert!(TickDivider::new(0).tick());
    }
}
