//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock ports or loopback sockets.  All tests run on the host
//! (x86_64) with no real hardware required.

#![cfg(not(target_os = "espidf"))]

mod http_tests;
mod mock_hw;
mod monitor_tests;
mod ota_tests;
mod scheduler_tests;
