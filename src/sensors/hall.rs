//! AH49E linear Hall-effect sensor driver.
//!
//! The magnet on the deadbolt raises the output voltage as the bolt
//! throws.  Raw counts go straight to the hysteresis machine; there is no
//! calibration or filtering stage.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH6 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::app::ports::SamplerPort;
use crate::fsm::RawSample;

static SIM_HALL_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_hall_adc(raw: u16) {
    SIM_HALL_ADC.store(raw, Ordering::Relaxed);
}

pub struct HallSensor {
    channel: u32,
    total_reads: u32,
}

impl HallSensor {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            total_reads: 0,
        }
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        crate::drivers::hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = self.channel;
        SIM_HALL_ADC.load(Ordering::Relaxed)
    }
}

impl SamplerPort for HallSensor {
    fn sample(&mut self) -> RawSample {
        self.total_reads = self.total_reads.saturating_add(1);
        RawSample(self.read_adc().min(RawSample::MAX))
    }
}
