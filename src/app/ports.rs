//! Port traits: the hexagonal boundary between the monitor core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService / Scheduler
//! ```
//!
//! Every port method is bounded: it either finishes its slice of work or
//! leaves the rest for the next scheduler iteration.  Nothing behind a port
//! may block indefinitely.

use crate::eventlog::EventLog;
use crate::fsm::RawSample;
use crate::http::routes::Route;

pub use embedded_hal::delay::DelayNs;

// ───────────────────────────────────────────────────────────────
// Sampler port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Reads the Hall sensor.  No failure mode: an analog read always
/// yields some value, possibly noisy.
pub trait SamplerPort {
    fn sample(&mut self) -> RawSample;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → log)
// ───────────────────────────────────────────────────────────────

/// The domain emits [`AppEvent`](super::events::AppEvent)s through this
/// port.  Emission is synchronous and completes before returning.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Update port (firmware update collaborator)
// ───────────────────────────────────────────────────────────────

/// Firmware update servicing, first duty of every iteration.
pub trait UpdatePort {
    /// Do one bounded slice of update work.  Every
    /// [`UpdateEvent`](crate::ota::UpdateEvent) produced during the slice is
    /// emitted into `sink` inline, in order.
    fn service(&mut self, sink: &mut dyn EventSink) -> UpdateOutcome;
}

/// What the update duty asks of the loop after its slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing pending.
    Idle,
    /// A session is open; more work next iteration.
    InProgress,
    /// A new image is bootable; the loop must stop and restart the device.
    RestartRequired,
}

// ───────────────────────────────────────────────────────────────
// Request port (HTTP collaborator)
// ───────────────────────────────────────────────────────────────

/// Network request servicing, second duty of every iteration.
pub trait RequestPort {
    /// Serve at most one pending request using a read-only view of the
    /// log.  Returns `None` when nothing was waiting.
    fn service_one(&mut self, log: &EventLog) -> Option<Served>;
}

/// Record of one served request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Served {
    pub route: Route,
    pub status: u16,
}

// ───────────────────────────────────────────────────────────────
// Heartbeat (watchdog)
// ───────────────────────────────────────────────────────────────

/// Proof of life once per iteration.
pub trait Heartbeat {
    fn beat(&mut self);
}
