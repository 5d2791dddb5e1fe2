#![no_std]
#![no_main]

mod globals;
mod prelude;

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Input, Pin, Pull};
use embassy_nrf::gpiote::Channel as _;
use embassy_nrf::pac::interrupt;
use embassy_nrf::ppi::ConfigurableChannel as _;
use embassy_time::{with_timeout, Duration, Timer};
use freqctr_fw::drivers::frequency::{self, PulseInput};
use freqctr_fw::types::Changes;
use freqctr_fw::{FrequencyCounter, GateMode};
use static_cell::StaticCell;

use globals::{CONFIG, COUNTER, EDGES, GATE_DIVIDER, SYS_TIMER};

/// Longest gate (100 s) plus the discarded first interval, with some margin.
const READ_TIMEOUT: Duration = Duration::from_secs(105);

/// Mode the reporter starts in.
const START_MODE: GateMode = GateMode::Gate1s;

static PULSE_INPUT: StaticCell<PulseInput<'static>> = StaticCell::new();

#[interrupt]
fn TIMER1() {
    frequency::acknowledge_rollover();
    COUNTER.on_rollover();
}

#[interrupt]
fn TIMER3() {
    frequency::acknowledge_systick();
    SYS_TIMER.on_interrupt();
}

fn gate_tick() {
    if GATE_DIVIDER.tick() {
        COUNTER.on_gate_tick();
    }
}

fn gate_edges(changes: &mut Changes) {
    COUNTER.on_edges(changes);
}

/// Forwards every transition of the gate pin to the edge source.
#[embassy_executor::task]
async fn gate_task(pin: AnyPin) {
    let mut gate = Input::new(pin, Pull::Up);
    EDGES.seed(frequency::port_levels());
    loop {
        gate.wait_for_any_edge().await;
        EDGES.on_pin_change(frequency::port_levels());
    }
}

/// Logs every reading as it completes.
#[embassy_executor::task]
async fn reporter_task(selector: i8) {
    let counter = FrequencyCounter::new(&COUNTER);
    match counter.set_mode(selector) {
        Ok(mode) => info!("measuring in {}", mode),
        Err(e) => error!("cannot select mode {}: {}", selector, e),
    }

    loop {
        if counter.mode().is_off() {
            Timer::after_secs(1).await;
            continue;
        }
        match with_timeout(READ_TIMEOUT, counter.read_formatted::<16>(true)).await {
            Ok(Ok(text)) => info!("{} Hz [{}] t={}ms", text.as_str(), counter.mode(), SYS_TIMER.millis()),
            Ok(Err(e)) => warn!("reading dropped: {}", e),
            Err(_) => warn!("no reading within {}s", READ_TIMEOUT.as_secs()),
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = embassy_nrf::config::Config::default();
    // The 1 MHz period clock and the gate tick are only as good as HFCLK.
    config.hfclk_source = embassy_nrf::config::HfclkSource::ExternalXtal;
    config.gpiote_interrupt_priority = embassy_nrf::interrupt::Priority::P2;
    config.time_interrupt_priority = embassy_nrf::interrupt::Priority::P2;
    let p = embassy_nrf::init(config);

    if let Err(e) = CONFIG.verify() {
        error!("counter configuration rejected: {}", e);
        return;
    }

    PULSE_INPUT.init(frequency::configure_pulse_input(
        p.TIMER1,
        p.P0_03.degrade(), // measured input
        p.GPIOTE_CH0.degrade(),
        p.PPI_CH0.degrade(),
    ));
    frequency::configure_micros(p.TIMER2);

    SYS_TIMER.set_hook(gate_tick);
    EDGES.set_hook(gate_edges);
    frequency::configure_systick(p.TIMER3);

    spawner.must_spawn(gate_task(p.P0_05.degrade())); // globals::GATE_PIN
    spawner.must_spawn(reporter_task(START_MODE.selector()));
}
