//! Bridge configuration.
//!
//! Loaded from a JSON file; every field has a default so a missing file
//! (or a partial one) yields a usable emulation setup:
//!
//! ```json
//! {
//!   "pins": { "d0": 25, "d1": 26 },
//!   "format": "w26",
//!   "facility_code": 123,
//!   "cooldown_ms": 5000,
//!   "diagnostics": false,
//!   "devices": [
//!     { "mac": "A4:C1:38:AB:CD:EF", "label": "Alice's phone" }
//!   ]
//! }
//! ```

use gatelink_core::constants::{DEFAULT_COOLDOWN_MS, DEFAULT_FACILITY_CODE};
use gatelink_core::{Error, Result, WiegandFormat};
use gatelink_hardware::PinAssignment;
use gatelink_presence::{CooldownTracker, CredentialPolicy, DeviceRegistry, RegisteredDevice};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Physical pin assignment for the D0/D1 lines.
    pub pins: PinAssignment,

    /// Credential format to transmit.
    pub format: WiegandFormat,

    /// Static facility code for the 26-bit format.
    pub facility_code: u8,

    /// Per-device cooldown window in milliseconds.
    pub cooldown_ms: u64,

    /// Enable the transmitter's diagnostic trace.
    pub diagnostics: bool,

    /// Authorized BLE devices.
    pub devices: Vec<RegisteredDevice>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pins: PinAssignment::default(),
            format: WiegandFormat::W26,
            facility_code: DEFAULT_FACILITY_CODE,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            diagnostics: false,
            devices: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or defaults when `path` is `None`.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read and `Error::Config`
    /// if it is not valid configuration JSON.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no config file given, using defaults");
            return Ok(Config::default());
        };

        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        debug!(
            path = %path.display(),
            devices = config.devices.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// The derivation policy this configuration selects.
    #[must_use]
    pub fn policy(&self) -> CredentialPolicy {
        CredentialPolicy {
            format: self.format,
            facility_code: self.facility_code,
        }
    }

    /// The device registry this configuration describes.
    #[must_use]
    pub fn registry(&self) -> DeviceRegistry {
        DeviceRegistry::from_devices(self.devices.clone())
    }

    /// The cooldown tracker this configuration selects.
    #[must_use]
    pub fn cooldown(&self) -> CooldownTracker {
        CooldownTracker::new(Duration::from_millis(self.cooldown_ms))
    }
}
