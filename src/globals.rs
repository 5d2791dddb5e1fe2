use freqctr_fw::drivers::frequency::{NrfMicros, NrfPulseCounter};
use freqctr_fw::edge::{EdgeSource, GateLine};
use freqctr_fw::systimer::{SysTimer, TickDivider};
use freqctr_fw::types::LineMask;
use freqctr_fw::{CounterConfig, GatedCounter};

/// P0 pin carrying the external gate. Counting runs while it is low.
pub const GATE_PIN: u8 = 5;

pub const CONFIG: CounterConfig = CounterConfig::new();

pub type Counter = GatedCounter<NrfPulseCounter, NrfMicros, GateLine<'static>>;

/// Pin-change state of P0. Fed by the gate task.
pub static EDGES: EdgeSource = EdgeSource::new();

/// 1 ms tick from TIMER3.
pub static SYS_TIMER: SysTimer = SysTimer::new();

/// Divides [`SYS_TIMER`] down to the gate cadence.
pub static GATE_DIVIDER: TickDivider = TickDivider::gate();

pub static COUNTER: Counter = GatedCounter::new(
    NrfPulseCounter::new(),
    NrfMicros,
    GateLine::new(&EDGES, LineMask::line(GATE_PIN)),
    CONFIG,
);
