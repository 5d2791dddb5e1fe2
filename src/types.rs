#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Mode selector outside the compiled-in range. Carries the rejected selector.
    InvalidMode(i8),
    /// The destination for a formatted reading cannot hold it.
    NoBuffer,
    /// A `CounterConfig` field is out of range.
    InvalidConfig,
}

/// Bit set of monitored input lines, one bit per line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineMask(pub u32);

impl LineMask {
    pub const NONE: LineMask = LineMask(0);

    pub const fn line(index: u8) -> Self {
        LineMask(1 << index)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn intersects(self, other: LineMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for LineMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        LineMask(self.0 | rhs.0)
    }
}

impl core::ops::BitAnd for LineMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        LineMask(self.0 & rhs.0)
    }
}

impl core::ops::BitXor for LineMask {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        LineMask(self.0 ^ rhs.0)
    }
}

impl core::ops::Not for LineMask {
    type Output = Self;

    fn not(self) -> Self::Output {
        LineMask(!self.0)
    }
}

/// Lines that transitioned since the last check. `fell` and `rose` are disjoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Changes {
    pub fell: LineMask,
    pub rose: LineMask,
}

impl Changes {
    pub const NONE: Changes = Changes {
        fell: LineMask::NONE,
        rose: LineMask::NONE,
    };

    pub const fn is_empty(&self) -> bool {
        self.fell.is_empty() && self.rose.is_empty()
    }

    /// Folds in a later set of changes. A line keeps only its latest direction.
    pub fn merge(&mut self, later: Changes) {
        self.fell = (self.fell & !later.rose) | later.fell;
        self.rose = (self.rose & !later.fell) | later.rose;
    }

    pub fn clear(&mut self, mask: LineMask) {
        self.fell = self.fell & !mask;
        self.rose = self.rose & !mask;
    }
}
