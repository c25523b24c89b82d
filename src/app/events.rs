//! Outbound application events.
//!
//! Everything the monitor reports goes through [`AppEvent`].  The
//! [`Display`](core::fmt::Display) impl is the exact line written to the
//! event log, so changing a format string here changes what remote
//! observers see at `/logs`.

use core::fmt;
use std::net::Ipv4Addr;

use crate::fsm::{LockState, Transition};
use crate::ota::UpdateEvent;

/// Structured events emitted by the monitor core and its bring-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The hysteresis machine flipped.
    LockChanged(Transition),

    /// Firmware update session progress.
    Update(UpdateEvent),

    /// Station associated and obtained an address.
    WifiConnected(Ipv4Addr),

    /// Update receiver is listening.
    UpdateReady,

    /// HTTP listener is bound.
    WebReady,

    /// Bring-up finished.
    SetupComplete,

    /// Final boot banner with the advertised network name.
    Running { hostname: heapless::String<32> },
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockChanged(t) => match t.to {
                LockState::Locked => write!(f, "\u{1f512} LOCKED ({})", t.sample),
                LockState::Unlocked => write!(f, "\u{1f513} UNLOCKED ({})", t.sample),
            },
            Self::Update(UpdateEvent::Started) => write!(f, "\u{1f504} OTA update start..."),
            Self::Update(UpdateEvent::Progress { percent }) => write!(f, "Progress: {}%", percent),
            Self::Update(UpdateEvent::Finished) => write!(f, "\u{2705} OTA update complete!"),
            Self::Update(UpdateEvent::Failed(e)) => write!(f, "\u{274c} OTA Error: {}", e.code()),
            Self::WifiConnected(ip) => write!(f, "\u{2705} Wi-Fi connected! IP: {}", ip),
            Self::UpdateReady => write!(f, "\u{1f680} OTA Ready"),
            Self::WebReady => write!(f, "\u{1f310} Web log UI at /  (live logs at /logs)"),
            Self::SetupComplete => write!(f, "Setup complete."),
            Self::Running { hostname } => {
                write!(f, "Front door lock monitor is running as: {}", hostname)
            }
        }
    }
}
