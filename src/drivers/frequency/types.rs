use embassy_nrf::{
    gpiote::InputChannel,
    ppi::{AnyConfigurableChannel, Ppi},
};

/// TIMER1 in counter mode. GPIOTE turns each rising input edge into a
/// COUNT task through PPI. CC[0] with a compare-clear short emulates an
/// 8-bit register: COMPARE0 is the rollover.
pub struct NrfPulseCounter {
    pub(super) running: bool,
}

/// TIMER2 free-running at 1 MHz over 32 bits.
pub struct NrfMicros;

/// Keeps the GPIOTE event and the PPI link that clock [`NrfPulseCounter`] alive.
pub struct PulseInput<'a> {
    pub ppi_ch: Ppi<'a, AnyConfigurableChannel, 1, 1>,
    pub gpiote_ch: InputChannel<'a>,
}
