//! Field firmware updates.
//!
//! Flow: client connects → 4-byte LE length → raw image → `OK\n` → reboot
//!
//! [`session`] owns the flash-side state machine (backed by `esp-ota` on the
//! device) and [`receiver`] is the single-client TCP front end that feeds
//! it one bounded chunk per scheduler iteration.  Every milestone surfaces
//! as an [`UpdateEvent`] handed to the scheduler's sink inline.

pub mod receiver;
pub mod session;

use core::fmt;

/// Tagged update-session notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Header accepted, inactive partition opened.
    Started,
    /// Integer percentage of the declared image written.  Emitted only
    /// when the value changes.
    Progress { percent: u8 },
    /// Image verified and marked bootable.
    Finished,
    /// Session aborted.  The core keeps running.
    Failed(UpdateError),
}

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    AlreadyInProgress,
    InvalidSize,
    /// No inactive partition, or opening it failed.
    Begin,
    /// The client connected but never sent a complete header.
    Connect,
    /// The connection dropped or stalled mid-transfer.
    Receive,
    WriteFailed,
    Overflow,
    NotReceiving,
    /// Finalize called before all declared bytes arrived.
    Incomplete,
    VerifyFailed,
    BootSetFailed,
}

impl UpdateError {
    /// Numeric code reported in the event log, following the classic OTA
    /// numbering (1 begin, 2 connect, 3 receive, 4 end).
    pub const fn code(self) -> u8 {
        match self {
            Self::AlreadyInProgress | Self::InvalidSize | Self::Begin => 1,
            Self::Connect => 2,
            Self::Receive | Self::WriteFailed | Self::Overflow | Self::NotReceiving => 3,
            Self::Incomplete | Self::VerifyFailed | Self::BootSetFailed => 4,
        }
    }
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInProgress => write!(f, "OTA session already in progress"),
            Self::InvalidSize => write!(f, "firmware size out of range (1 B to 4 MB)"),
            Self::Begin => write!(f, "OTA begin failed"),
            Self::Connect => write!(f, "client sent no header"),
            Self::Receive => write!(f, "connection lost during transfer"),
            Self::WriteFailed => write!(f, "OTA write failed"),
            Self::Overflow => write!(f, "chunk would exceed declared firmware size"),
            Self::NotReceiving => write!(f, "operation requires active Receiving state"),
            Self::Incomplete => write!(f, "finalize called before all bytes written"),
            Self::VerifyFailed => write!(f, "OTA verification failed"),
            Self::BootSetFailed => write!(f, "set boot partition failed"),
        }
    }
}

impl std::error::Error for UpdateError {}
