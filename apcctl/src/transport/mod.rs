//! Telnet transport layer.
//!
//! This module provides the low-level TCP connection to the PDU console,
//! with a deadline on every read and write.

pub mod config;
mod telnet;

pub use config::{DEFAULT_TIMEOUT, DeviceEndpoint, TELNET_PORT};
pub use telnet::TelnetTransport;
