//! mDNS advertisement adapter.
//!
//! Publishes `<hostname>.local` with two services: `_http._tcp` for the
//! log viewer and `_doorlock._tcp` for the update receiver.  Uses the raw
//! ESP-IDF mDNS component on the device and is a no-op on simulation
//! targets.

use log::info;

use crate::config::ShortString;

const HTTP_SERVICE: &[u8] = b"_http\0";
const OTA_SERVICE: &[u8] = b"_doorlock\0";
const PROTO_TCP: &[u8] = b"_tcp\0";

pub struct MdnsAdapter {
    hostname: ShortString,
    http_port: u16,
    ota_port: u16,
    active: bool,
}

impl MdnsAdapter {
    pub fn new(hostname: ShortString, http_port: u16, ota_port: u16) -> Self {
        Self {
            hostname,
            http_port,
            ota_port,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Start hostname + service advertisement.  Call after WiFi has an IP.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        if self.platform_start() {
            self.active = true;
            info!(
                "mDNS: advertising {}.local (http:{}, ota:{})",
                self.hostname, self.http_port, self.ota_port
            );
        }
    }

    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.platform_stop();
        self.active = false;
        info!("mDNS: stopped");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&self) -> bool {
        use esp_idf_svc::sys::*;

        let mut hostname_buf = [0u8; 33];
        let hb = self.hostname.as_bytes();
        hostname_buf[..hb.len()].copy_from_slice(hb);

        // SAFETY: every pointer passed below is a NUL-terminated buffer
        // that outlives the call; mdns copies what it keeps.
        unsafe {
            let ret = mdns_init();
            if ret != ESP_OK as i32 {
                log::error!("mDNS: mdns_init failed ({})", ret);
                return false;
            }
            mdns_hostname_set(hostname_buf.as_ptr() as *const _);
            mdns_instance_name_set(b"Front Door Monitor\0".as_ptr() as *const _);

            for (service, port) in [(HTTP_SERVICE, self.http_port), (OTA_SERVICE, self.ota_port)] {
                let ret = mdns_service_add(
                    core::ptr::null(),
                    service.as_ptr() as *const _,
                    PROTO_TCP.as_ptr() as *const _,
                    port,
                    core::ptr::null_mut(),
                    0,
                );
                if ret != ESP_OK as i32 {
                    log::warn!("mDNS: service add failed on port {} ({})", port, ret);
                }
            }
        }
        true
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&self) -> bool {
        let _ = (HTTP_SERVICE, OTA_SERVICE, PROTO_TCP);
        info!("mDNS(sim): registered {}.local", self.hostname);
        true
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&self) {
        // SAFETY: mdns was initialised by platform_start.
        unsafe {
            esp_idf_svc::sys::mdns_free();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&self) {
        info!("mDNS(sim): unregistered");
    }
}
