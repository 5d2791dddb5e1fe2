//! The public face of the counter: mode selection by number, readiness, and
//! raw or formatted readings.

use heapless::String;

use crate::counter::types::{GateMode, MAX_SELECTOR};
use crate::counter::GatedCounter;
use crate::drivers::{GateInput, MicrosClock, PulseCounter};
use crate::format::{self, Measurement};
use crate::types::Error;

pub struct FrequencyCounter<'a, H, C, G> {
    engine: &'a GatedCounter<H, C, G>,
}

impl<'a, H, C, G> FrequencyCounter<'a, H, C, G>
where
    H: PulseCounter,
    C: MicrosClock,
    G: GateInput,
{
    pub const fn new(engine: &'a GatedCounter<H, C, G>) -> Self {
        Self { engine }
    }

    /// Selects a mode by number and returns the mode now in effect. A negative
    /// selector changes nothing and only reports the current mode.
    pub fn set_mode(&self, selector: i8) -> Result<GateMode, Error> {
        if selector < 0 {
            return Ok(self.engine.mode());
        }
        match GateMode::from_selector(selector) {
            Ok(mode) => Ok(self.engine.select(mode)),
            Err(e) => {
                warn!("mode selector {} out of range 0..={}", selector, MAX_SELECTOR);
                Err(e)
            }
        }
    }

    pub fn mode(&self) -> GateMode {
        self.engine.mode()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    /// The raw count (or elapsed microseconds in period mode) scaled by the
    /// input prescaler. With `wait`, first waits for a fresh reading unless the
    /// counter is off. Always consumes the ready flag.
    pub async fn read_raw(&self, wait: bool) -> u32 {
        if wait {
            self.engine.wait_ready().await;
        }
        let snapshot = self.engine.take();
        snapshot.raw.saturating_mul(snapshot.input_prescaler)
    }

    /// The reading as a frequency. Consumes the ready flag like [`read_raw`](Self::read_raw).
    pub async fn measurement(&self, wait: bool) -> Measurement {
        if wait {
            self.engine.wait_ready().await;
        }
        format::measure(&self.engine.take())
    }

    /// The reading rendered as decimal text into a string of capacity `N`.
    pub async fn read_formatted<const N: usize>(&self, wait: bool) -> Result<String<N>, Error> {
        let measurement = self.measurement(wait).await;
        format::render(&measurement)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use embassy_futures::block_on;
    use embassy_futures::join::join;

    use super::*;
    use crate::config::CounterConfig;
    use crate::counter::types::MODES;
    use crate::drivers::sim::{SimClock, SimCounter, SimGate};
    use crate::types::LineMask;

    type SimEngine<'a> = GatedCounter<SimCounter, SimClock<'a>, SimGate<'a>>;

    fn engine<'a>(now: &'a Cell<u32>, armed: &'a Cell<bool>, config: CounterConfig) -> SimEngine<'a> {
        GatedCounter::new(
            SimCounter::new(),
            SimClock(now),
            SimGate {
                line: LineMask::line(5),
                armed,
            },
            config,
        )
    }

    fn pulses(engine: &SimEngine<'_>, n: u32) {
        for _ in 0..n {
            if engine.hardware(|hw| hw.pulse()) {
                engine.on_rollover();
            }
        }
    }

    fn ticks(engine: &SimEngine<'_>, n: u32) {
        for _ in 0..n {
            engine.on_gate_tick();
        }
    }

    #[test]
    fn every_selector_round_trips() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        for (selector, mode) in MODES.iter().enumerate() {
            assert_eq!(counter.set_mode(selector as i8), Ok(*mode));
            assert_eq!(counter.set_mode(-1), Ok(*mode));
            assert_eq!(counter.mode().selector(), selector as i8);
        }
    }

    #[test]
    fn out_of_range_selector_keeps_the_mode() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(2).unwrap();
        let bad = MAX_SELECTOR + 1;
        assert_eq!(counter.set_mode(bad), Err(Error::InvalidMode(bad)));
        assert_eq!(counter.mode(), GateMode::Gate10ms);
    }

    #[test]
    fn reads_are_idempotent() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(3).unwrap();
        ticks(&engine, 1);
        pulses(&engine, 432);
        ticks(&engine, 10);
        assert!(counter.is_ready());

        assert_eq!(block_on(counter.read_raw(false)), 432);
        assert!(!counter.is_ready());
        assert_eq!(block_on(counter.read_raw(false)), 432);
    }

    #[test]
    fn short_gate_scales_to_hertz() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(2).unwrap();
        ticks(&engine, 1);
        pulses(&engine, 123);
        ticks(&engine, 1);
        assert_eq!(block_on(counter.read_formatted::<12>(false)).unwrap(), "12300");
    }

    #[test]
    fn long_gate_shows_decimals() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(4).unwrap();
        ticks(&engine, 1);
        pulses(&engine, 12_345);
        ticks(&engine, 1000);
        assert_eq!(block_on(counter.read_formatted::<12>(false)).unwrap(), "1234.5");
    }

    #[test]
    fn input_prescaler_multiplies_readings() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let config = CounterConfig::new().with_input_prescaler(4);
        let engine = engine(&now, &armed, config);
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(1).unwrap();
        ticks(&engine, 1);
        pulses(&engine, 250);
        ticks(&engine, 100);
        assert_eq!(block_on(counter.read_raw(false)), 1000);
    }

    #[test]
    fn undersized_buffer_is_an_error() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(2).unwrap();
        ticks(&engine, 1);
        pulses(&engine, 123);
        ticks(&engine, 1);
        assert_eq!(block_on(counter.read_formatted::<3>(false)), Err(Error::NoBuffer));
    }

    #[test]
    fn off_mode_never_blocks() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        assert_eq!(counter.set_mode(0), Ok(GateMode::Off));
        assert_eq!(block_on(counter.read_raw(true)), 0);
    }

    #[test]
    fn waiting_read_returns_after_the_gate_closes() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);
        counter.set_mode(2).unwrap();

        let gate = async {
            embassy_futures::yield_now().await;
            ticks(&engine, 1);
            pulses(&engine, 64);
            embassy_futures::yield_now().await;
            ticks(&engine, 1);
        };
        let (value, ()) = block_on(join(counter.read_raw(true), gate));
        assert_eq!(value, 64);
    }

    #[test]
    fn switching_off_releases_a_waiting_read() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);
        counter.set_mode(1).unwrap();
        ticks(&engine, 1);
        pulses(&engine, 40);

        let switch = async {
            embassy_futures::yield_now().await;
            assert_eq!(counter.set_mode(0), Ok(GateMode::Off));
        };
        let (value, ()) = block_on(join(counter.read_raw(true), switch));
        assert_eq!(value, 0);
        assert!(!counter.is_ready());
    }

    #[test]
    fn mode_change_restarts_a_waiting_formatted_read() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);
        counter.set_mode(1).unwrap();

        let switch = async {
            embassy_futures::yield_now().await;
            counter.set_mode(2).unwrap();
            embassy_futures::yield_now().await;
            // Still waiting: the new mode has produced nothing yet.
            assert!(!counter.is_ready());
            ticks(&engine, 1);
            pulses(&engine, 7);
            ticks(&engine, 1);
        };
        let (text, ()) = block_on(join(counter.read_formatted::<12>(true), switch));
        assert_eq!(text.unwrap(), "700");
    }

    #[cfg(feature = "period")]
    #[test]
    fn period_timeout_reads_zero() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(GateMode::Period1.selector()).unwrap();
        ticks(&engine, 500);
        assert_eq!(block_on(counter.read_formatted::<12>(true)).unwrap(), "0.00000");
    }

    #[cfg(feature = "period")]
    #[test]
    fn one_second_period_reads_one_hertz() {
        let (now, armed) = (Cell::new(0), Cell::new(false));
        let engine = engine(&now, &armed, CounterConfig::default());
        let counter = FrequencyCounter::new(&engine);

        counter.set_mode(GateMode::Period1.selector()).unwrap();
        pulses(&engine, 1);
        now.set(1_000_000);
        pulses(&engine, 1);
        assert_eq!(block_on(counter.read_formatted::<12>(true)).unwrap(), "1.00000");
        // Consumed: the same value no longer inverts.
        assert_eq!(block_on(counter.read_formatted::<12>(false)).unwrap(), "999999");
    }
}
