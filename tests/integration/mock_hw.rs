//! Mock ports for integration tests.
//!
//! Each mock records what the scheduler asked of it so tests can assert
//! on duty order and counts without real hardware.

use std::collections::VecDeque;

use doorlock::app::events::AppEvent;
use doorlock::app::ports::{
    DelayNs, EventSink, Heartbeat, RequestPort, SamplerPort, Served, UpdateOutcome, UpdatePort,
};
use doorlock::config::DeviceConfig;
use doorlock::eventlog::EventLog;
use doorlock::fsm::RawSample;
use doorlock::ota::UpdateEvent;

// ── Sampler ───────────────────────────────────────────────────

/// Replays a fixed sequence, then repeats the last value.
pub struct ScriptedSampler {
    samples: VecDeque<u16>,
    last: u16,
    pub reads: usize,
}

#[allow(dead_code)]
impl ScriptedSampler {
    pub fn new(samples: &[u16]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            last: 0,
            reads: 0,
        }
    }
}

impl SamplerPort for ScriptedSampler {
    fn sample(&mut self) -> RawSample {
        self.reads += 1;
        if let Some(s) = self.samples.pop_front() {
            self.last = s;
        }
        RawSample(self.last)
    }
}

// ── Update ────────────────────────────────────────────────────

/// Emits one scripted batch of update events per service call.
#[derive(Default)]
pub struct ScriptedUpdate {
    steps: VecDeque<(Vec<UpdateEvent>, UpdateOutcome)>,
    pub calls: usize,
}

#[allow(dead_code)]
impl ScriptedUpdate {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn then(mut self, events: &[UpdateEvent], outcome: UpdateOutcome) -> Self {
        self.steps.push_back((events.to_vec(), outcome));
        self
    }
}

impl UpdatePort for ScriptedUpdate {
    fn service(&mut self, sink: &mut dyn EventSink) -> UpdateOutcome {
        self.calls += 1;
        let Some((events, outcome)) = self.steps.pop_front() else {
            return UpdateOutcome::Idle;
        };
        for e in events {
            sink.emit(&AppEvent::Update(e));
        }
        outcome
    }
}

// ── Requests ──────────────────────────────────────────────────

/// Captures a `/logs` body every call.
#[derive(Default)]
pub struct SnapshotRequests {
    pub bodies: Vec<String>,
}

impl RequestPort for SnapshotRequests {
    fn service_one(&mut self, log: &EventLog) -> Option<Served> {
        self.bodies.push(log.snapshot().to_owned());
        None
    }
}

// ── Delay / heartbeat ─────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    pub total_ms: u64,
    pub calls: usize,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
    }
}

#[derive(Default)]
pub struct CountingBeat {
    pub beats: usize,
}

impl Heartbeat for CountingBeat {
    fn beat(&mut self) {
        self.beats += 1;
    }
}

// ── Config ────────────────────────────────────────────────────

/// Valid configuration with credentials filled in.
#[allow(dead_code)]
pub fn test_config() -> DeviceConfig {
    DeviceConfig::from_sources(None, Some("TestNet"), Some("password1"), Some("frontdoor"))
        .expect("valid test config")
}
