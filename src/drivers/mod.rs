//! Hardware the counter engine drives. The engine only sees these traits; the
//! nRF52 binding lives in [`frequency`] and a host simulation backs the tests.

#[cfg(feature = "firmware")]
pub mod frequency;
#[cfg(test)]
pub(crate) mod sim;

use crate::types::LineMask;

/// The hardware counting register, clocked by the measured input.
pub trait PulseCounter {
    /// Register width in bits. The register rolls over every `2^WIDTH` pulses.
    const WIDTH: u32;

    /// Enables external clocking.
    fn start(&mut self);

    /// Disables external clocking, returning whether it was enabled.
    fn stop(&mut self) -> bool;

    /// Current register value.
    fn count(&self) -> u32;

    /// Zeroes the register so the next rollover comes after a full `2^WIDTH` pulses.
    fn clear(&mut self);

    /// Arms the register so the next rollover comes after exactly `pulses` pulses.
    fn preload(&mut self, pulses: u32);

    /// Enables the rollover interrupt.
    fn listen(&mut self);

    /// Disables the rollover interrupt.
    fn unlisten(&mut self);

    /// Drops a rollover that is latched but not yet serviced, returning
    /// whether there was one.
    fn clear_pending(&mut self) -> bool;
}

/// Free-running microsecond counter. Wraps at `u32::MAX`.
pub trait MicrosClock {
    fn now_micros(&self) -> u32;
}

/// The line that opens and closes the counting window in external-gate mode.
pub trait GateInput {
    fn line(&self) -> LineMask;

    /// Starts reporting transitions of [`GateInput::line`].
    fn arm(&mut self);

    fn disarm(&mut self);
}

/// Mask covering a `width`-bit register.
pub const fn width_mask(width: u32) -> u32 {
    if width >= u32::BITS {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}
