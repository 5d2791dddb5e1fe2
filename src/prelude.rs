use defmt_rtt as _; // global logger
use embassy_nrf as _; // time driver
use panic_probe as _;
