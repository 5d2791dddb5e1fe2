// Public interfaces.
pub mod types;

pub use types::CounterConfig;

/// Gate-advance granularity. The tick source must call
/// [`crate::GatedCounter::on_gate_tick`] once per this many milliseconds.
pub const GATE_TICK_MS: u32 = 10;

/// How long a period measurement may wait for its transitions before the
/// watchdog reports "no signal".
pub const DEFAULT_PERIOD_TIMEOUT_MS: u32 = 5000;

/// Divider fitted in front of the counting input. 1 means none.
pub const DEFAULT_INPUT_PRESCALER: u32 = 1;
