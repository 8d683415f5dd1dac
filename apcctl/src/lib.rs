//! # apcctl
//!
//! Control APC switched power distribution units over their telnet console.
//!
//! The PDU only offers a menu-driven text interface: log in, pick numbered
//! entries until the outlet's control screen is reached, choose an action
//! and confirm it with `YES`. apcctl walks that menu tree deterministically
//! and parses the outlet status block for queries.
//!
//! ## Features
//!
//! - Async telnet sessions via tokio, one connection per operation
//! - A deadline on every read and write
//! - Menu navigation described as data ([`driver::MenuPlan`])
//! - Status parsing that reports which device field failed
//! - Port resolution by number, alias, or last used port
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apcctl::{AliasTable, DeviceEndpoint, OutletController, resolve_port};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), apcctl::Error> {
//!     let mut aliases = AliasTable::new();
//!     aliases.insert(3, "printer");
//!
//!     let port = resolve_port("printer", 1, &aliases)?;
//!
//!     let pdu = OutletController::new(DeviceEndpoint::new("10.0.0.5", "apc", "apc"))?;
//!     pdu.on(port).await?;
//!
//!     let status = pdu.status().await?;
//!     println!("{}", status);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod port;
pub mod status;
pub mod transport;

// Re-export main types for convenience
pub use driver::{MenuPlan, OutletCommand, OutletController, SessionState};
pub use error::{Error, ErrorKind, Result};
pub use port::{AliasTable, PortNumber, ResolveError, resolve_port};
pub use status::{OUTLET_COUNT, OutletStatus, StatusError, parse_status};
pub use transport::{DeviceEndpoint, TelnetTransport};
