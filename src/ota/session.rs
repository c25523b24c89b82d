//! Flash-side OTA state machine, backed by `esp-ota` on the device.
//!
//! The session only knows about sizes and bytes; the transport that
//! delivers them lives in [`receiver`](super::receiver).

use log::{info, warn};

use super::UpdateError;

const MAX_FIRMWARE_SIZE: u32 = 4 * 1024 * 1024; // 4 MB

// ── State machine ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Receiving {
        expected_size: u32,
        bytes_written: u32,
    },
    Verifying,
    ReadyToReboot,
    Failed,
}

/// OTA firmware update session.
///
/// On ESP-IDF targets, uses the `esp-ota` crate for safe partition
/// management.  On simulation targets only the counters move.
pub struct UpdateSession {
    state: SessionState,
    last_percent: Option<u8>,
    #[cfg(target_os = "espidf")]
    ota_update: Option<esp_ota::OtaUpdate>,
}

impl UpdateSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            last_percent: None,
            #[cfg(target_os = "espidf")]
            ota_update: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Receiving { .. })
    }

    /// Open the inactive partition for an image of `firmware_size` bytes.
    pub fn begin(&mut self, firmware_size: u32) -> Result<(), UpdateError> {
        if self.is_active() {
            return Err(UpdateError::AlreadyInProgress);
        }
        if firmware_size == 0 || firmware_size > MAX_FIRMWARE_SIZE {
            return Err(UpdateError::InvalidSize);
        }

        #[cfg(target_os = "espidf")]
        {
            let update = esp_ota::OtaUpdate::begin().map_err(|e| {
                warn!("esp-ota begin failed: {:?}", e);
                UpdateError::Begin
            })?;
            self.ota_update = Some(update);
        }

        self.state = SessionState::Receiving {
            expected_size: firmware_size,
            bytes_written: 0,
        };
        self.last_percent = None;
        info!("OTA: begin ({} bytes)", firmware_size);
        Ok(())
    }

    /// Append the next chunk.  Returns the new integer percentage when it
    /// differs from the last one reported.
    pub fn write(&mut self, data: &[u8]) -> Result<Option<u8>, UpdateError> {
        let SessionState::Receiving {
            expected_size,
            bytes_written,
        } = self.state
        else {
            return Err(UpdateError::NotReceiving);
        };

        let len = u32::try_from(data.len()).map_err(|_| UpdateError::Overflow)?;
        let new_written = bytes_written
            .checked_add(len)
            .filter(|&n| n <= expected_size)
            .ok_or(UpdateError::Overflow)?;

        #[cfg(target_os = "espidf")]
        {
            let Some(update) = self.ota_update.as_mut() else {
                return Err(UpdateError::NotReceiving);
            };
            if let Err(e) = update.write(data) {
                warn!("esp-ota write failed: {:?}", e);
                self.abort();
                return Err(UpdateError::WriteFailed);
            }
        }

        self.state = SessionState::Receiving {
            expected_size,
            bytes_written: new_written,
        };

        let percent = percent_of(new_written, expected_size);
        if self.last_percent == Some(percent) {
            return Ok(None);
        }
        self.last_percent = Some(percent);
        Ok(Some(percent))
    }

    /// Whether every declared byte has been written.
    pub fn is_complete(&self) -> bool {
        matches!(
            self.state,
            SessionState::Receiving { expected_size, bytes_written } if expected_size == bytes_written
        )
    }

    /// Verify the image, mark its partition bootable, set ReadyToReboot.
    pub fn finalize(&mut self) -> Result<(), UpdateError> {
        match self.state {
            SessionState::Receiving {
                expected_size,
                bytes_written,
            } if bytes_written == expected_size => {}
            SessionState::Receiving { .. } => return Err(UpdateError::Incomplete),
            _ => return Err(UpdateError::NotReceiving),
        }

        self.state = SessionState::Verifying;

        #[cfg(target_os = "espidf")]
        {
            let Some(update) = self.ota_update.take() else {
                self.state = SessionState::Failed;
                return Err(UpdateError::NotReceiving);
            };
            let mut completed = update.finalize().map_err(|e| {
                warn!("esp-ota finalize failed: {:?}", e);
                self.state = SessionState::Failed;
                UpdateError::VerifyFailed
            })?;
            completed.set_as_boot_partition().map_err(|e| {
                warn!("esp-ota set_as_boot_partition failed: {:?}", e);
                self.state = SessionState::Failed;
                UpdateError::BootSetFailed
            })?;
        }

        self.state = SessionState::ReadyToReboot;
        info!("OTA: finalized, ready to reboot");
        Ok(())
    }

    /// Abort the current session; resets to Idle.
    pub fn abort(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            // esp-ota aborts automatically when OtaUpdate is dropped
            self.ota_update.take();
        }
        if self.state != SessionState::Idle {
            warn!("OTA: aborted");
        }
        self.state = SessionState::Idle;
        self.last_percent = None;
    }
}

impl Default for UpdateSession {
    fn default() -> Self {
        Self::new()
    }
}

fn percent_of(done: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    (u64::from(done) * 100 / u64::from(total)) as u8
}

// ── Boot validation ───────────────────────────────────────────

/// Mark the running image valid so the bootloader does not roll back.
#[cfg(target_os = "espidf")]
pub fn check_rollback() {
    match esp_ota::mark_app_valid() {
        Ok(()) => info!("OTA: firmware marked valid (rollback cancelled)"),
        Err(e) => warn!("OTA: mark_app_valid failed: {:?}", e),
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn check_rollback() {
    info!("OTA rollback check (simulation): skipped");
}

// ── Tests ─────────────────────────────────────────────────────
