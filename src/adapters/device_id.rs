//! Device identity derived from the ESP32 factory MAC address.
//!
//! The fallback hostname is `frontdoor-xxyyzz` (last 3 bytes of the
//! 6-byte MAC, lowercase hex).  It is stable across reboots and used for
//! both DHCP and mDNS when no hostname is configured.

use core::fmt::Write;

use crate::config::ShortString;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

const HOSTNAME_PREFIX: &str = "frontdoor";

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: esp_efuse_mac_get_default writes exactly 6 bytes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Format: `frontdoor-xxyyzz` (16 chars).
pub fn hostname(mac: &MacAddress) -> ShortString {
    let mut name = ShortString::new();
    let _ = write!(
        name,
        "{}-{:02x}{:02x}{:02x}",
        HOSTNAME_PREFIX, mac[3], mac[4], mac[5]
    );
    name
}
