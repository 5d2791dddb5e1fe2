//! Fixed-point decimal rendering of counter readings. No floating point: a
//! reading is an integer plus the number of digits that sit after the point.

use core::fmt::{self, Write};

use heapless::String;

use crate::counter::types::Snapshot;
use crate::counter::NO_SIGNAL;
use crate::types::Error;

/// Digits after the point in period-mode frequencies.
pub const PERIOD_DECIMALS: u8 = 5;

/// Microseconds per second times 10^[`PERIOD_DECIMALS`].
pub const PERIOD_NUMERATOR: u64 = 100_000_000_000;

/// Shortest elapsed time per averaged period that is still inverted. Anything
/// shorter would not fit the result in 32 bits.
pub const MIN_ELAPSED_PER_PERIOD: u32 = 24;

/// What is shown when the input is too fast to time.
pub const TOO_HIGH: u32 = 999_999;

/// `value / 10^decimals`, kept as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub value: u32,
    pub decimals: u8,
}

impl Reading {
    pub const fn new(value: u32, decimals: u8) -> Self {
        Self { value, decimals }
    }

    const fn scale(self) -> u32 {
        10u32.pow(self.decimals as u32)
    }

    pub const fn integer(self) -> u32 {
        self.value / self.scale()
    }

    pub const fn fraction(self) -> u32 {
        self.value % self.scale()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.integer())?;
        if self.decimals > 0 {
            write!(
                f,
                ".{:0width$}",
                self.fraction(),
                width = usize::from(self.decimals)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Measurement {
    /// Frequency in Hz.
    Frequency(Reading),
    /// Period mode timed out waiting for transitions. Shown as `0.00000`.
    NoSignal,
    /// Period mode saw transitions too close together to invert. Shown as `999999`.
    TooHigh,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Frequency(reading) => reading.fmt(f),
            Measurement::NoSignal => Reading::new(0, PERIOD_DECIMALS).fmt(f),
            Measurement::TooHigh => Reading::new(TOO_HIGH, 0).fmt(f),
        }
    }
}

/// Scales a gated count to Hz. Gates shorter than a second are multiplied up to
/// a whole-second integer; longer gates keep their extra resolution as decimals.
pub fn gate_reading(raw: u32, prescale_init: u16) -> Reading {
    let magnitude = prescale_init.checked_ilog10().unwrap_or(0) as i32 - 2;
    if magnitude < 0 {
        Reading::new(raw.saturating_mul(10u32.pow(magnitude.unsigned_abs())), 0)
    } else {
        Reading::new(raw, magnitude as u8)
    }
}

/// `(10^11 * average) / elapsed`: frequency in units of 10^-5 Hz.
pub fn invert_period(elapsed: u64, average: u32) -> u64 {
    (PERIOD_NUMERATOR * u64::from(average)) / elapsed.max(1)
}

/// Converts a period-mode raw value (elapsed microseconds over `average`
/// periods) to a frequency. `fresh` is whether the ready flag was up.
pub fn period_measurement(raw: u32, fresh: bool, average: u8) -> Measurement {
    let average = u32::from(average);
    if fresh && raw > MIN_ELAPSED_PER_PERIOD * average {
        match u32::try_from(invert_period(u64::from(raw), average)) {
            Ok(value) => Measurement::Frequency(Reading::new(value, PERIOD_DECIMALS)),
            Err(_) => Measurement::TooHigh,
        }
    } else if raw == NO_SIGNAL {
        Measurement::NoSignal
    } else {
        Measurement::TooHigh
    }
}

/// Turns a snapshot into a frequency, applying gate scaling, period inversion
/// and the input prescaler.
pub fn measure(snapshot: &Snapshot) -> Measurement {
    let prescaler = snapshot.input_prescaler;
    if snapshot.mode.is_period() {
        match period_measurement(snapshot.raw, snapshot.fresh, snapshot.period_average) {
            Measurement::Frequency(reading) => match reading.value.checked_mul(prescaler) {
                Some(value) => Measurement::Frequency(Reading::new(value, reading.decimals)),
                None => Measurement::TooHigh,
            },
            other => other,
        }
    } else {
        Measurement::Frequency(gate_reading(
            snapshot.raw.saturating_mul(prescaler),
            snapshot.prescale_init,
        ))
    }
}

/// Renders into a string of capacity `N`, or [`Error::NoBuffer`] when it does not fit.
pub fn render<const N: usize>(measurement: &Measurement) -> Result<String<N>, Error> {
    let mut out = String::new();
    write!(out, "{}", measurement).map_err(|_| Error::NoBuffer)?;
    Ok(out)
}
