use crate::config::CounterConfig;
use crate::types::Error;

/// Measurement mode. Selector numbers (see [`GateMode::selector`]) follow the
/// order of [`MODES`], which shrinks when optional modes are compiled out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateMode {
    #[default]
    Off,
    Gate1s,
    Gate10ms,
    Gate100ms,
    Gate10s,
    Gate100s,
    /// Count while the gate line is low.
    #[cfg(feature = "ext-gate")]
    ExternalGate,
    /// Time a single input period.
    #[cfg(feature = "period")]
    Period1,
    /// Time 10 input periods.
    #[cfg(feature = "period")]
    Period10,
    /// Time 100 input periods.
    #[cfg(feature = "period")]
    Period100,
}

/// Every selectable mode, indexed by selector.
pub const MODES: &[GateMode] = &[
    GateMode::Off,
    GateMode::Gate1s,
    GateMode::Gate10ms,
    GateMode::Gate100ms,
    GateMode::Gate10s,
    GateMode::Gate100s,
    #[cfg(feature = "ext-gate")]
    GateMode::ExternalGate,
    #[cfg(feature = "period")]
    GateMode::Period1,
    #[cfg(feature = "period")]
    GateMode::Period10,
    #[cfg(feature = "period")]
    GateMode::Period100,
];

/// Highest selector accepted by [`GateMode::from_selector`].
pub const MAX_SELECTOR: i8 = (MODES.len() - 1) as i8;

impl GateMode {
    /// Looks up a selector. Negative selectors are the "query" sentinel and are
    /// handled by the caller; here they are rejected like any other bad value.
    pub fn from_selector(selector: i8) -> Result<Self, Error> {
        usize::try_from(selector)
            .ok()
            .and_then(|index| MODES.get(index))
            .copied()
            .ok_or(Error::InvalidMode(selector))
    }

    pub fn selector(self) -> i8 {
        MODES
            .iter()
            .position(|mode| *mode == self)
            .map_or(0, |index| index as i8)
    }

    /// Gate time on a sequential scale: 0=off, 1=10ms, 2=100ms, 3=1s,
    /// 4=10s, 5=100s. External gate books as 1s; period modes have no gate.
    pub const fn gate_class(self) -> u8 {
        match self {
            GateMode::Off => 0,
            GateMode::Gate10ms => 1,
            GateMode::Gate100ms => 2,
            GateMode::Gate1s => 3,
            GateMode::Gate10s => 4,
            GateMode::Gate100s => 5,
            #[cfg(feature = "ext-gate")]
            GateMode::ExternalGate => 3,
            #[cfg(feature = "period")]
            GateMode::Period1 | GateMode::Period10 | GateMode::Period100 => 0,
        }
    }

    /// Number of 10 ms ticks in one gate interval (0 when no timed gate).
    pub const fn gate_ticks(self) -> u16 {
        match self.gate_class() {
            0 => 0,
            class => 10u16.pow(class as u32 - 1),
        }
    }

    /// Prescale reload value: the gate length, or the watchdog in period modes.
    pub const fn prescale_init(self, config: &CounterConfig) -> u16 {
        if self.is_period() {
            config.timeout_ticks()
        } else {
            self.gate_ticks()
        }
    }

    /// Periods averaged per sample: 1, 10 or 100. `None` outside period modes.
    pub const fn period_average(self) -> Option<u8> {
        match self {
            #[cfg(feature = "period")]
            GateMode::Period1 => Some(1),
            #[cfg(feature = "period")]
            GateMode::Period10 => Some(10),
            #[cfg(feature = "period")]
            GateMode::Period100 => Some(100),
            _ => None,
        }
    }

    pub const fn is_period(self) -> bool {
        self.period_average().is_some()
    }

    pub const fn is_external(self) -> bool {
        match self {
            #[cfg(feature = "ext-gate")]
            GateMode::ExternalGate => true,
            _ => false,
        }
    }

    pub const fn is_off(self) -> bool {
        matches!(self, GateMode::Off)
    }
}

/// The software extension of the hardware counter. Counting modes keep the
/// number of rollovers; period mode keeps the timestamp of the last qualifying
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Accumulator {
    Overflows(u32),
    AwaitingStart,
    Since(u32),
}

impl Accumulator {
    pub const fn reset_for(mode: GateMode) -> Self {
        if mode.is_period() {
            Accumulator::AwaitingStart
        } else {
            Accumulator::Overflows(0)
        }
    }
}

pub struct CounterState<H, C, G> {
    pub hw: H,
    pub clock: C,
    pub gate: G,
    pub config: CounterConfig,
    pub mode: GateMode,
    pub raw: u32,
    pub accumulator: Accumulator,
    /// Ticks left in the current gate interval. 0 means no tick-driven gating.
    pub countdown: u16,
    pub prescale_init: u16,
    pub period_average: u8,
}

/// Everything the formatter needs, captured in one critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub raw: u32,
    /// The ready flag was set when the value was taken.
    pub fresh: bool,
    pub mode: GateMode,
    pub prescale_init: u16,
    pub period_average: u8,
    pub input_prescaler: u32,
}
