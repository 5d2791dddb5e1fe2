#![cfg_attr(not(test), no_std)]

//! Gated frequency / period counter.
//!
//! A hardware counting register is extended in software, gated by a 10 ms
//! tick and read back through a single-slot "latest reading" mailbox. See
//! [`frequency_counter::FrequencyCounter`] for the consumer side and
//! [`counter::GatedCounter`] for the interrupt side.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod counter;
pub mod drivers;
pub mod edge;
pub mod format;
pub mod frequency_counter;
pub mod systimer;
pub mod types;

pub use config::CounterConfig;
pub use counter::types::GateMode;
pub use counter::GatedCounter;
pub use frequency_counter::FrequencyCounter;
pub use types::Error;
