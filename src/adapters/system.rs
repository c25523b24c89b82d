//! Terminal device actions.

use log::warn;

use crate::scheduler::RestartReason;

/// Reset the chip.  All in-memory state (lock state, event log) is lost.
#[cfg(target_os = "espidf")]
pub fn restart(reason: RestartReason) -> ! {
    warn!("System: restarting ({})", reason);
    esp_idf_hal::reset::restart()
}

/// Simulation: end the process.
#[cfg(not(target_os = "espidf"))]
pub fn restart(reason: RestartReason) -> ! {
    warn!("System(sim): restart requested ({})", reason);
    std::process::exit(0)
}
