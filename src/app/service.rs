//! Monitor service: the device context.
//!
//! [`MonitorService`] owns the only [`LockFsm`] and the only [`EventLog`].
//! The scheduler holds it by exclusive reference and lends it to each duty
//! in turn, so both are single-writer without any locking.
//!
//! ```text
//!  SamplerPort ──▶ ┌──────────────────────┐ ──▶ EventLog ──▶ RequestPort
//!                  │    MonitorService    │        (read-only snapshot)
//!  UpdatePort ───▶ │  LockFsm · EventLog  │
//!                  └──────────────────────┘
//! ```

use crate::config::{ConfigError, DeviceConfig};
use crate::eventlog::EventLog;
use crate::fsm::{LockFsm, LockState, RawSample, Transition};

use super::events::AppEvent;
use super::ports::{EventSink, SamplerPort};

/// Device context threaded through the scheduler loop.
pub struct MonitorService {
    fsm: LockFsm,
    log: EventLog,
    samples: u64,
    last_sample: Option<RawSample>,
}

impl MonitorService {
    /// Build from a validated configuration.
    pub fn new(config: &DeviceConfig) -> Result<Self, ConfigError> {
        let fsm = LockFsm::new(config.thresholds()?);
        let log = EventLog::new(config.log_capacity, config.log_trim_target);
        Ok(Self::from_parts(fsm, log))
    }

    pub fn from_parts(fsm: LockFsm, log: EventLog) -> Self {
        Self {
            fsm,
            log,
            samples: 0,
            last_sample: None,
        }
    }

    // ── Sensing duty ──────────────────────────────────────────

    /// Take one sample, evaluate it, and log the transition if any.
    /// Exactly one log append per transition.
    pub fn sense(&mut self, sampler: &mut impl SamplerPort) -> Option<Transition> {
        let sample = sampler.sample();
        self.samples = self.samples.wrapping_add(1);
        self.last_sample = Some(sample);

        let transition = self.fsm.step(sample)?;
        self.log.emit(&AppEvent::LockChanged(transition));
        Some(transition)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> LockState {
        self.fsm.state()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Samples evaluated since boot.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    pub fn last_sample(&self) -> Option<RawSample> {
        self.last_sample
    }

    pub fn transition_count(&self) -> u32 {
        self.fsm.transition_count()
    }
}

impl EventSink for MonitorService {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
    }
}
