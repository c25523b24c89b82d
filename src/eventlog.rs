//! Volatile, capacity-bounded event log.
//!
//! One growable text buffer of `\n`-terminated lines.  When the buffer
//! grows past `capacity`, the prefix up to and including the first newline
//! at or after `trim_target` is dropped, so the remaining text always starts
//! on a line boundary.  The cut repeats until the buffer fits again.
//!
//! Every append is mirrored to the console logger under the
//! `doorlock::events` target.  The log lives for the whole process; a
//! restart is the only way to clear it.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Log target used for the console mirror.
pub const CONSOLE_TARGET: &str = "doorlock::events";

/// Extra room reserved above `capacity` so a typical line never forces a
/// reallocation before eviction runs.
const LINE_HEADROOM: usize = 128;

/// Append-only text ring.
#[derive(Debug, Clone)]
pub struct EventLog {
    buf: String,
    capacity: usize,
    trim_target: usize,
    evictions: u32,
}

impl EventLog {
    /// A `trim_target` at or above `capacity` is clamped to
    /// `capacity - 1`.  [`DeviceConfig::validate`] rejects such values
    /// for configured logs.
    ///
    /// [`DeviceConfig::validate`]: crate::config::DeviceConfig::validate
    pub fn new(capacity: usize, trim_target: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity + LINE_HEADROOM),
            capacity,
            trim_target: trim_target.min(capacity.saturating_sub(1)),
            evictions: 0,
        }
    }

    /// Append one line.  Never fails.
    pub fn append(&mut self, message: &str) {
        info!(target: CONSOLE_TARGET, "{}", message);

        let needed = message.len() + 1;
        if self.buf.try_reserve(needed).is_err() {
            // Allocator refused: make room from the oldest end first.
            self.evict();
            if self.buf.try_reserve(needed).is_err() {
                self.buf.clear();
            }
        }

        self.buf.push_str(message);
        self.buf.push('\n');

        while self.buf.len() > self.capacity {
            if !self.evict() {
                break;
            }
        }
    }

    /// Current contents, verbatim.
    pub fn snapshot(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of eviction passes since boot.
    pub fn evictions(&self) -> u32 {
        self.evictions
    }

    /// Drop whole lines up to the first boundary at or after `trim_target`.
    ///
    /// Scans bytes rather than chars: `\n` is ASCII, so the cut is always a
    /// valid UTF-8 boundary.
    ///
    /// Returns `false` when nothing was cut.
    fn evict(&mut self) -> bool {
        let bytes = self.buf.as_bytes();
        if self.trim_target >= bytes.len() {
            return false;
        }
        let Some(pos) = bytes[self.trim_target..].iter().position(|&b| b == b'\n') else {
            return false;
        };
        let cut = self.trim_target + pos + 1;
        self.buf.drain(..cut);
        self.evictions = self.evictions.saturating_add(1);
        true
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.append(&event.to_string());
    }
}
