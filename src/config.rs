//! Device configuration parameters
//!
//! All tunable parameters for the door-lock monitor.  Nothing here is
//! hard-coded into the core logic: values come from [`DeviceConfig::default`],
//! optionally overridden by a JSON document and individual credential
//! strings captured at build time (the device has no filesystem).

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::fsm::{RawSample, Thresholds};

/// SSID / hostname storage (802.11 SSIDs are at most 32 bytes).
pub type ShortString = heapless::String<32>;
/// WPA2 passphrase storage.
pub type SecretString = heapless::String<64>;

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    // --- Network ---
    /// Station SSID
    pub wifi_ssid: ShortString,
    /// Station passphrase (empty for an open network)
    pub wifi_password: SecretString,
    /// Network name advertised over mDNS; empty = derive from MAC
    pub hostname: ShortString,

    // --- Hysteresis ---
    /// Raw reading above which an unlocked door becomes locked
    pub locked_at: u16,
    /// Raw reading below which a locked door becomes unlocked
    pub unlocked_at: u16,

    // --- Event log ---
    /// Byte size that triggers eviction
    pub log_capacity: usize,
    /// Offset of the first line boundary kept after eviction
    pub log_trim_target: usize,

    // --- Timing ---
    /// Scheduler sleep at the end of every iteration (milliseconds)
    pub loop_interval_ms: u32,
    /// Per-request socket timeout for HTTP and OTA (milliseconds)
    pub request_timeout_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Ports ---
    pub http_port: u16,
    pub ota_port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: ShortString::new(),
            wifi_password: SecretString::new(),
            hostname: ShortString::new(),

            locked_at: 2000,
            unlocked_at: 1900,

            log_capacity: 4000,
            log_trim_target: 1500,

            loop_interval_ms: 100,      // 10 Hz
            request_timeout_ms: 250,
            watchdog_timeout_ms: 10_000,

            http_port: 80,
            ota_port: 3232,
        }
    }
}

/// Longest allowed loop sleep; anything slower starves the HTTP poller.
const MAX_LOOP_INTERVAL_MS: u32 = 10_000;

impl DeviceConfig {
    /// Merge configuration sources, later overriding earlier:
    /// defaults → `json` → individual credential overrides.
    ///
    /// The result is validated except for an empty hostname, which the
    /// caller resolves from the MAC via [`DeviceConfig::with_hostname_fallback`].
    pub fn from_sources(
        json: Option<&str>,
        ssid: Option<&str>,
        password: Option<&str>,
        hostname: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut cfg = match json {
            Some(doc) if !doc.trim().is_empty() => Self::from_json(doc)?,
            _ => Self::default(),
        };
        if let Some(s) = ssid {
            cfg.wifi_ssid = bounded(s, "wifi_ssid longer than 32 bytes")?;
        }
        if let Some(p) = password {
            cfg.wifi_password = bounded(p, "wifi_password longer than 64 bytes")?;
        }
        if let Some(h) = hostname {
            cfg.hostname = bounded(h, "hostname longer than 32 bytes")?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Sources captured by `build.rs` at compile time.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_sources(
            option_env!("DOORLOCK_CONFIG"),
            option_env!("DOORLOCK_WIFI_SSID"),
            option_env!("DOORLOCK_WIFI_PASSWORD"),
            option_env!("DOORLOCK_HOSTNAME"),
        )
    }

    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(doc).map_err(|_| ConfigError::Parse)
    }

    /// Fill an empty hostname with `fallback` and re-validate.
    pub fn with_hostname_fallback(mut self, fallback: &str) -> Result<Self, ConfigError> {
        if self.hostname.is_empty() {
            self.hostname = bounded(fallback, "hostname longer than 32 bytes")?;
            validate_hostname(&self.hostname)?;
        }
        Ok(self)
    }

    /// The validated hysteresis band.
    pub fn thresholds(&self) -> Result<Thresholds, ConfigError> {
        Thresholds::new(self.locked_at, self.unlocked_at)
    }

    /// Range-check every field.  An empty hostname is accepted here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds()?;
        if self.locked_at > RawSample::MAX {
            return Err(ConfigError::Validation("locked_at exceeds 12-bit ADC range"));
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::Validation("log_capacity must be non-zero"));
        }
        if self.log_trim_target >= self.log_capacity {
            return Err(ConfigError::Validation(
                "log_trim_target must be below log_capacity",
            ));
        }
        if self.loop_interval_ms == 0 || self.loop_interval_ms > MAX_LOOP_INTERVAL_MS {
            return Err(ConfigError::Validation("loop_interval_ms must be 1..=10000"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Validation("request_timeout_ms must be non-zero"));
        }
        if self.watchdog_timeout_ms <= self.loop_interval_ms {
            return Err(ConfigError::Validation(
                "watchdog_timeout_ms must exceed loop_interval_ms",
            ));
        }
        validate_ssid(&self.wifi_ssid)?;
        validate_password(&self.wifi_password)?;
        if !self.hostname.is_empty() {
            validate_hostname(&self.hostname)?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Validation helpers
// ───────────────────────────────────────────────────────────────

fn bounded<const N: usize>(
    s: &str,
    msg: &'static str,
) -> Result<heapless::String<N>, ConfigError> {
    let mut out = heapless::String::new();
    out.push_str(s).map_err(|()| ConfigError::Validation(msg))?;
    Ok(out)
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConfigError> {
    if ssid.is_empty() {
        return Err(ConfigError::MissingCredentials);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConfigError::Validation("wifi_ssid must be printable ASCII"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConfigError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 {
        return Err(ConfigError::Validation("wifi_password must be 8-64 bytes"));
    }
    Ok(())
}

fn validate_hostname(hostname: &str) -> Result<(), ConfigError> {
    let ok = !hostname.is_empty()
        && !hostname.starts_with('-')
        && !hostname.ends_with('-')
        && hostname
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Validation("hostname must be [a-z0-9-], no edge hyphen"))
    }
}

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

/// Errors from building or validating a [`DeviceConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No SSID was supplied by any source.
    MissingCredentials,
    /// The JSON document could not be parsed.
    Parse,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    Validation(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "no WiFi SSID configured"),
            Self::Parse => write!(f, "config JSON could not be parsed"),
            Self::Validation(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
