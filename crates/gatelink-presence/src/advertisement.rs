//! Observed BLE advertisements.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use gatelink_core::MacAddress;

/// A single observed BLE advertisement.
///
/// Only the fields the access flow consumes are modeled: the advertiser's
/// MAC address (the identity the registry and derivation work from), the
/// signal strength when the scanner reports it, and the raw manufacturer
/// payload for diagnostics.
///
/// # Examples
///
/// ```
/// use gatelink_core::MacAddress;
/// use gatelink_presence::Advertisement;
///
/// let mac = MacAddress::parse("A4:C1:38:AB:CD:EF").unwrap();
/// let adv = Advertisement::new(mac).with_rssi(-67);
/// assert_eq!(adv.rssi, Some(-67));
/// ```
#[derive(Debug, Clone)]
pub struct Advertisement {
    /// Advertiser MAC address.
    pub mac: MacAddress,

    /// Received signal strength in dBm, if the scanner reports it.
    pub rssi: Option<i16>,

    /// Raw manufacturer-specific payload bytes.
    pub manufacturer_data: Bytes,

    /// When the advertisement was observed.
    pub seen_at: DateTime<Utc>,
}

impl Advertisement {
    /// Create an advertisement observed now, with no RSSI or payload.
    #[must_use]
    pub fn new(mac: MacAddress) -> Self {
        Advertisement {
            mac,
            rssi: None,
            manufacturer_data: Bytes::new(),
            seen_at: Utc::now(),
        }
    }

    /// Attach a reported signal strength.
    #[must_use]
    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Attach the manufacturer-specific payload.
    #[must_use]
    pub fn with_manufacturer_data(mut self, data: Bytes) -> Self {
        self.manufacturer_data = data;
        self
    }

    /// Override the observation timestamp (for replays and tests).
    #[must_use]
    pub fn with_seen_at(mut self, at: DateTime<Utc>) -> Self {
        self.seen_at = at;
        self
    }
}
