//! Byte transports shared by the HTTP and OTA collaborators.

pub mod tcp;
pub mod transport;
