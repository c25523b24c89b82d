//! Unified error type for the door-lock monitor.
//!
//! Every subsystem keeps its own error enum; bring-up funnels them into
//! [`Error`] so `main` has one type to report.  All variants are `Copy`.

use core::fmt;

use crate::adapters::wifi::ConnectivityError;
use crate::config::ConfigError;
use crate::drivers::hw_init::HwInitError;
use crate::net::tcp::TransportError;
use crate::ota::UpdateError;

/// Every fallible bring-up operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Station association failed.
    Connectivity(ConnectivityError),
    /// A listener could not be bound.
    Transport(TransportError),
    /// Firmware update machinery failed.
    Update(UpdateError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Connectivity(e) => write!(f, "wifi: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Update(e) => write!(f, "ota: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Connectivity(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Update(e) => Some(e),
            Self::Init(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<UpdateError> for Error {
    fn from(e: UpdateError) -> Self {
        Self::Update(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}
