//! Authorized-device registry.

use gatelink_core::MacAddress;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A registered BLE device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredDevice {
    /// The device's MAC address.
    pub mac: MacAddress,

    /// Optional operator-facing label ("Alice's phone").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The allowlist of devices permitted to trigger a transmission.
///
/// Membership checks scan the whole list and compare each entry with
/// [`MacAddress`]'s constant-time equality, so lookup cost does not depend
/// on where (or whether) the probe matches. The list is small by nature
/// (an access allowlist, not a directory), which keeps the scan
/// cheaper than any observable timing difference a map lookup would leak.
///
/// # Examples
///
/// ```
/// use gatelink_core::MacAddress;
/// use gatelink_presence::DeviceRegistry;
///
/// let mut registry = DeviceRegistry::new();
/// let mac = MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap();
/// registry.add(mac, Some("test fob".to_string()));
///
/// assert!(registry.is_authorized(&mac));
/// assert!(!registry.is_authorized(&MacAddress::parse("11:22:33:44:55:66").unwrap()));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceRegistry {
    devices: Vec<RegisteredDevice>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from registered devices.
    #[must_use]
    pub fn from_devices(devices: Vec<RegisteredDevice>) -> Self {
        DeviceRegistry { devices }
    }

    /// Register a device.
    ///
    /// Re-registering an already present MAC replaces its label rather
    /// than duplicating the entry.
    pub fn add(&mut self, mac: MacAddress, label: Option<String>) {
        if let Some(existing) = self.devices.iter_mut().find(|d| d.mac == mac) {
            existing.label = label;
            return;
        }
        debug!(%mac, "device registered");
        self.devices.push(RegisteredDevice { mac, label });
    }

    /// Remove a device; returns `true` if it was present.
    pub fn remove(&mut self, mac: &MacAddress) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| d.mac != *mac);
        self.devices.len() != before
    }

    /// Check whether a MAC is on the allowlist.
    ///
    /// Scans every entry unconditionally so the comparison count is
    /// independent of the probe.
    #[must_use]
    pub fn is_authorized(&self, mac: &MacAddress) -> bool {
        let mut found = false;
        for device in &self.devices {
            found |= device.mac == *mac;
        }
        found
    }

    /// Look up a device's registration entry.
    #[must_use]
    pub fn lookup(&self, mac: &MacAddress) -> Option<&RegisteredDevice> {
        self.devices.iter().find(|d| d.mac == *mac)
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no devices are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate the registered devices.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredDevice> {
        self.devices.iter()
    }
}
