//! Adapters: concrete implementations of the hexagonal port traits and
//! the device services around them.
//!
//! | Adapter     | Implements       | Connects to             |
//! |-------------|------------------|-------------------------|
//! | `wifi`      | ConnectivityPort | ESP-IDF WiFi STA        |
//! | `mdns`      |                  | ESP-IDF mDNS component  |
//! | `device_id` |                  | eFuse factory MAC       |
//! | `system`    |                  | chip reset              |
//!
//! The sampler, HTTP and OTA adapters live with their subsystems in
//! `sensors`, `http` and `ota`.

pub mod device_id;
pub mod mdns;
pub mod system;
pub mod wifi;
