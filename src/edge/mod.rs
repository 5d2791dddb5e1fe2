//! Pin-change detection for the monitored input port.

pub mod types;

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::drivers::GateInput;
use crate::types::{Changes, LineMask};

pub use types::EdgeDetector;

fn no_hook(_: &mut Changes) {}

/// Interrupt-safe [`EdgeDetector`] with a hook that sees every new transition.
///
/// The hook gets the accumulated changes and clears the bits it handles; what
/// it leaves stays queued for [`EdgeSource::pending`].
pub struct EdgeSource {
    detector: Mutex<CriticalSectionRawMutex, RefCell<EdgeDetector>>,
    hook: Mutex<CriticalSectionRawMutex, Cell<fn(&mut Changes)>>,
}

impl EdgeSource {
    pub const fn new() -> Self {
        Self {
            detector: Mutex::new(RefCell::new(EdgeDetector::new())),
            hook: Mutex::new(Cell::new(no_hook as fn(&mut Changes))),
        }
    }

    pub fn set_hook(&self, hook: fn(&mut Changes)) {
        self.hook.lock(|cell| cell.set(hook));
    }

    pub fn seed(&self, levels: LineMask) {
        self.detector.lock(|detector| detector.borrow_mut().seed(levels));
    }

    pub fn enable(&self, mask: LineMask) {
        self.detector.lock(|detector| detector.borrow_mut().enable(mask));
    }

    pub fn disable(&self, mask: LineMask) {
        self.detector.lock(|detector| detector.borrow_mut().disable(mask));
    }

    /// Pin-change interrupt body: samples `levels` and runs the hook if any
    /// enabled line moved.
    pub fn on_pin_change(&self, levels: LineMask) {
        let hook = self.hook.lock(Cell::get);
        self.dispatch(levels, hook);
    }

    /// Samples `levels` and hands any new transitions to `handler`. Returns
    /// the changes still queued afterwards.
    pub fn dispatch(&self, levels: LineMask, handler: impl FnOnce(&mut Changes)) -> Changes {
        self.detector.lock(|detector| {
            let mut pending = {
                let mut detector = detector.borrow_mut();
                if detector.sample(levels).is_empty() {
                    return detector.changes();
                }
                detector.replace_changes(Changes::NONE)
            };
            handler(&mut pending);

            let mut detector = detector.borrow_mut();
            pending.clear(!detector.enabled());
            let mut queued = detector.changes();
            queued.merge(pending);
            detector.replace_changes(queued);
            queued
        })
    }

    pub fn pending(&self) -> Changes {
        self.detector.lock(|detector| detector.borrow().changes())
    }

    pub fn clear(&self, mask: LineMask) {
        self.detector.lock(|detector| detector.borrow_mut().clear(mask));
    }
}

impl Default for EdgeSource {
    fn default() -> Self {
        Self::new()
    }
}

/// One line of an [`EdgeSource`] used as the external gate.
#[derive(Clone, Copy)]
pub struct GateLine<'a> {
    source: &'a EdgeSource,
    mask: LineMask,
}

impl<'a> GateLine<'a> {
    pub const fn new(source: &'a EdgeSource, mask: LineMask) -> Self {
        Self { source, mask }
    }
}

impl GateInput for GateLine<'_> {
    fn line(&self) -> LineMask {
        self.mask
    }

    fn arm(&mut self) {
        self.source.enable(self.mask);
    }

    fn disarm(&mut self) {
        self.source.disable(self.mask);
    }
}
