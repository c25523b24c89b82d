//! Hardware initialisation and loop-side peripheral helpers.

pub mod delay;
pub mod hw_init;
pub mod watchdog;
