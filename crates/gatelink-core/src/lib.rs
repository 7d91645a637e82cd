//! Shared domain types for the Gatelink access bridge.
//!
//! This crate holds the vocabulary every other workspace member speaks:
//! MAC addresses of trusted BLE devices, the supported Wiegand/EM4100
//! credential formats, the credentials themselves, and the workspace-wide
//! error taxonomy. Protocol timing constants live in [`constants`].

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Credential, MacAddress, WiegandFormat};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
