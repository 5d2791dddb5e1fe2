use crate::types::{Changes, LineMask};

/// Turns successive level samples of a port into falling and rising sets.
/// Only enabled lines are reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeDetector {
    last: LineMask,
    enabled: LineMask,
    changes: Changes,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            last: LineMask::NONE,
            enabled: LineMask::NONE,
            changes: Changes::NONE,
        }
    }

    /// Records the current levels without reporting anything.
    pub fn seed(&mut self, levels: LineMask) {
        self.last = levels;
    }

    /// Starts reporting `mask`. The last sampled level is the reference, so
    /// nothing is reported for these lines until they actually move.
    pub fn enable(&mut self, mask: LineMask) {
        self.enabled = self.enabled | mask;
    }

    /// Stops reporting `mask` and drops anything accumulated for it.
    pub fn disable(&mut self, mask: LineMask) {
        self.enabled = self.enabled & !mask;
        self.changes.clear(mask);
    }

    pub fn enabled(&self) -> LineMask {
        self.enabled
    }

    /// Compares `levels` against the previous sample. Returns this sample's
    /// transitions and adds them to the accumulated set.
    pub fn sample(&mut self, levels: LineMask) -> Changes {
        let moved = (levels ^ self.last) & self.enabled;
        let new = Changes {
            fell: moved & self.last,
            rose: moved & levels,
        };
        self.last = levels;
        self.changes.merge(new);
        new
    }

    pub fn falling(&self, mask: LineMask) -> bool {
        self.changes.fell.intersects(mask)
    }

    pub fn rising(&self, mask: LineMask) -> bool {
        self.changes.rose.intersects(mask)
    }

    /// Either direction.
    pub fn change(&self, mask: LineMask) -> bool {
        self.falling(mask) || self.rising(mask)
    }

    pub fn clear(&mut self, mask: LineMask) {
        self.changes.clear(mask);
    }

    pub fn changes(&self) -> Changes {
        self.changes
    }

    pub(crate) fn replace_changes(&mut self, changes: Changes) -> Changes {
        core::mem::replace(&mut self.changes, changes)
    }
}
