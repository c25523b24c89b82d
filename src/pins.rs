//! GPIO / peripheral pin assignments for the door monitor board.
//!
//! Single source of truth: drivers reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors: analog (ADC1)
// ---------------------------------------------------------------------------

/// AH49E linear Hall sensor, analog output near the strike plate.
/// ADC1 channel 6 (GPIO 34 on the classic ESP32).  Input-only pin.
pub const HALL_ADC_GPIO: i32 = 34;
/// ADC1 channel number matching [`HALL_ADC_GPIO`].
pub const ADC1_CH_HALL: u32 = 6;
