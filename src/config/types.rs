use crate::types::Error;

use super::{DEFAULT_INPUT_PRESCALER, DEFAULT_PERIOD_TIMEOUT_MS, GATE_TICK_MS};

// Declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterConfig {
    /// Period-mode watchdog in milliseconds. Must be a whole number of gate ticks.
    pub period_timeout_ms: u32,
    /// External divider in front of the counting input; readings are multiplied by it.
    pub input_prescaler: u32,
}

// Implementations
impl Default for CounterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterConfig {
    pub const fn new() -> Self {
        Self {
            period_timeout_ms: DEFAULT_PERIOD_TIMEOUT_MS,
            input_prescaler: DEFAULT_INPUT_PRESCALER,
        }
    }

    pub const fn with_period_timeout_ms(self, period_timeout_ms: u32) -> Self {
        Self {
            period_timeout_ms,
            ..self
        }
    }

    pub const fn with_input_prescaler(self, input_prescaler: u32) -> Self {
        Self {
            input_prescaler,
            ..self
        }
    }

    /// Period timeout expressed in gate ticks, held to `1..=u16::MAX` so the
    /// watchdog always fires. [`verify`](Self::verify) rejects values outside it.
    pub const fn timeout_ticks(&self) -> u16 {
        let ticks = self.period_timeout_ms / GATE_TICK_MS;
        if ticks == 0 {
            1
        } else if ticks > u16::MAX as u32 {
            u16::MAX
        } else {
            ticks as u16
        }
    }

    /// Verifies that the fields are in the expected ranges.
    pub fn verify(self) -> Result<Self, Error> {
        let ticks = self.period_timeout_ms / GATE_TICK_MS;
        if self.period_timeout_ms % GATE_TICK_MS != 0 || ticks == 0 || ticks > u16::MAX as u32 {
            return Err(Error::InvalidConfig);
        }
        if self.input_prescaler == 0 {
            return Err(Error::InvalidConfig);
        }

        Ok(self)
    }
}
