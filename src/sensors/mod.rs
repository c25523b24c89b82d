//! Sensor drivers.  The monitor has exactly one: the Hall sensor behind
//! the [`SamplerPort`](crate::app::ports::SamplerPort).

pub mod hall;
