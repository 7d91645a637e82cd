use crate::Result;
use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// MAC address of a BLE device (6 octets).
///
/// Accepts the common textual renderings (`AA:BB:CC:DD:EE:FF`,
/// `aa-bb-cc-dd-ee-ff`, `aabb.ccdd.eeff`, or bare `AABBCCDDEEFF`) and
/// normalizes to uppercase colon form for display and serialization.
///
/// # Security
/// MAC membership in the authorized-device list is an authorization
/// decision, so equality is constant-time to prevent timing attacks.
#[derive(Debug, Clone, Copy, Eq)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Create a MAC address from raw octets.
    #[must_use]
    pub fn from_octets(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }

    /// Parse a MAC address, tolerating `:`/`-`/`.` separators or none.
    ///
    /// # Errors
    /// Returns `Error::InvalidMacAddress` if the input does not contain
    /// exactly twelve hex digits after separator removal.
    ///
    /// # Examples
    ///
    /// ```
    /// use gatelink_core::MacAddress;
    ///
    /// let mac = MacAddress::parse("a4:c1:38:ab:cd:ef").unwrap();
    /// assert_eq!(mac.to_string(), "A4:C1:38:AB:CD:EF");
    ///
    /// assert!(MacAddress::parse("a4:c1:38").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let hex: String = input
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | '.'))
            .collect();

        if hex.len() != 12 {
            return Err(Error::invalid_mac(
                input,
                format!("expected 12 hex digits, got {}", hex.len()),
            ));
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            let pair = &hex[i * 2..i * 2 + 2];
            *octet = u8::from_str_radix(pair, 16)
                .map_err(|_| Error::invalid_mac(input, format!("invalid hex pair '{pair}'")))?;
        }

        Ok(MacAddress(octets))
    }

    /// Get the raw octets, most significant first.
    #[must_use]
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Octets 5–6 as a big-endian u16 (the 26-bit card number source).
    #[must_use]
    pub fn tail_u16(&self) -> u16 {
        u16::from_be_bytes([self.0[4], self.0[5]])
    }

    /// Octets 3–4 as a big-endian u16 (the 34-bit facility code source).
    #[must_use]
    pub fn mid_u16(&self) -> u16 {
        u16::from_be_bytes([self.0[2], self.0[3]])
    }

    /// Octets 2–5 as a big-endian u32 (the EM4100 card-id source).
    #[must_use]
    pub fn body_u32(&self) -> u32 {
        u32::from_be_bytes([self.0[1], self.0[2], self.0[3], self.0[4]])
    }

    /// First octet (the EM4100 version source).
    #[must_use]
    pub fn head_u8(&self) -> u8 {
        self.0[0]
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl std::str::FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MacAddress::parse(s)
    }
}

/// Constant-time comparison implementation for MacAddress
///
/// This prevents timing attacks by ensuring comparison takes the same time
/// regardless of where the octets differ.
impl PartialEq for MacAddress {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

/// Hash implementation for MacAddress
///
/// Implements standard hashing for use in hash-based collections.
impl std::hash::Hash for MacAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MacAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Credential transmission format.
///
/// Selects the total bit count on the wire, whether parity framing is
/// applied, and how the payload is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiegandFormat {
    /// 26-bit Wiegand: even parity, 8-bit facility code, 16-bit card
    /// number, odd parity.
    W26,

    /// 34-bit Wiegand: even parity, 16-bit facility code, 16-bit card
    /// number, odd parity.
    W34,

    /// 40-bit EM4100-style: 8-bit version plus 32-bit card id, no parity.
    Em4100,
}

impl WiegandFormat {
    /// Create a format from its wire bit count.
    ///
    /// This is the single validation point for the supported set: any
    /// other bit count is rejected before a transmission can start.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedBitLength` for bit counts other than
    /// 26, 34, or 40.
    ///
    /// # Examples
    ///
    /// ```
    /// use gatelink_core::WiegandFormat;
    ///
    /// assert_eq!(WiegandFormat::from_bit_count(26).unwrap(), WiegandFormat::W26);
    /// assert!(WiegandFormat::from_bit_count(32).is_err());
    /// ```
    pub fn from_bit_count(bits: u8) -> Result<Self> {
        match bits {
            26 => Ok(WiegandFormat::W26),
            34 => Ok(WiegandFormat::W34),
            40 => Ok(WiegandFormat::Em4100),
            _ => Err(Error::UnsupportedBitLength { bits }),
        }
    }

    /// Total number of bits placed on the wire.
    #[inline]
    #[must_use]
    pub fn bit_count(self) -> u8 {
        match self {
            WiegandFormat::W26 => 26,
            WiegandFormat::W34 => 34,
            WiegandFormat::Em4100 => 40,
        }
    }

    /// Number of payload bits (total minus parity framing).
    #[inline]
    #[must_use]
    pub fn data_bits(self) -> u8 {
        match self {
            WiegandFormat::W26 => 24,
            WiegandFormat::W34 => 32,
            WiegandFormat::Em4100 => 40,
        }
    }

    /// Returns `true` if the format frames the payload with parity bits.
    #[inline]
    #[must_use]
    pub fn has_parity(self) -> bool {
        !matches!(self, WiegandFormat::Em4100)
    }

    /// Mask covering the payload bits of this format.
    #[inline]
    #[must_use]
    pub fn data_mask(self) -> u64 {
        (1u64 << self.data_bits()) - 1
    }
}

impl fmt::Display for WiegandFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WiegandFormat::W26 => write!(f, "26-bit Wiegand"),
            WiegandFormat::W34 => write!(f, "34-bit Wiegand"),
            WiegandFormat::Em4100 => write!(f, "40-bit EM4100"),
        }
    }
}

/// A credential ready for transmission.
///
/// Field ranges are enforced by the variant types themselves: a 26-bit
/// facility code cannot exceed 8 bits because it *is* a `u8`. `packed()`
/// produces the payload exactly as the convenience send operations pack it.
///
/// # Examples
///
/// ```
/// use gatelink_core::{Credential, WiegandFormat};
///
/// let cred = Credential::Wiegand26 { facility: 123, card: 52719 };
/// assert_eq!(cred.format(), WiegandFormat::W26);
/// assert_eq!(cred.packed(), 0x7BCDEF);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Credential {
    /// 26-bit Wiegand credential.
    Wiegand26 { facility: u8, card: u16 },

    /// 34-bit Wiegand credential.
    Wiegand34 { facility: u16, card: u16 },

    /// 40-bit EM4100 credential.
    Em4100 { version: u8, card_id: u32 },
}

impl Credential {
    /// The wire format this credential transmits as.
    #[must_use]
    pub fn format(&self) -> WiegandFormat {
        match self {
            Credential::Wiegand26 { .. } => WiegandFormat::W26,
            Credential::Wiegand34 { .. } => WiegandFormat::W34,
            Credential::Em4100 { .. } => WiegandFormat::Em4100,
        }
    }

    /// The packed numeric payload, facility/version in the high bits.
    ///
    /// - 26-bit: `(facility << 16) | card` (24 significant bits)
    /// - 34-bit: `(facility << 16) | card` (32 significant bits)
    /// - EM4100: `(version << 32) | card_id` (40 significant bits)
    #[must_use]
    pub fn packed(&self) -> u64 {
        match *self {
            Credential::Wiegand26 { facility, card } => ((facility as u64) << 16) | card as u64,
            Credential::Wiegand34 { facility, card } => ((facility as u64) << 16) | card as u64,
            Credential::Em4100 { version, card_id } => ((version as u64) << 32) | card_id as u64,
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Credential::Wiegand26 { facility, card } => {
                write!(f, "W26 facility={facility} card={card}")
            }
            Credential::Wiegand34 { facility, card } => {
                write!(f, "W34 facility={facility} card={card}")
            }
            Credential::Em4100 { version, card_id } => {
                write!(f, "EM4100 version=0x{version:02X} card_id=0x{card_id:08X}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A4:C1:38:AB:CD:EF")]
    #[case("a4-c1-38-ab-cd-ef")]
    #[case("a4c1.38ab.cdef")]
    #[case("A4C138ABCDEF")]
    fn test_mac_parse_formats(#[case] input: &str) {
        let mac = MacAddress::parse(input).unwrap();
        assert_eq!(mac.to_string(), "A4:C1:38:AB:CD:EF");
        assert_eq!(mac.octets(), [0xA4, 0xC1, 0x38, 0xAB, 0xCD, 0xEF]);
    }

    #[rstest]
    #[case("A4:C1:38:AB:CD")] // too short
    #[case("A4:C1:38:AB:CD:EF:00")] // too long
    #[case("G4:C1:38:AB:CD:EF")] // non-hex
    #[case("")]
    fn test_mac_parse_invalid(#[case] input: &str) {
        assert!(MacAddress::parse(input).is_err());
    }

    #[test]
    fn test_mac_field_accessors() {
        let mac = MacAddress::parse("A4:C1:38:AB:CD:EF").unwrap();
        assert_eq!(mac.head_u8(), 0xA4);
        assert_eq!(mac.mid_u16(), 0x38AB);
        assert_eq!(mac.tail_u16(), 0xCDEF);
        assert_eq!(mac.body_u32(), 0xC138ABCD);
    }

    #[test]
    fn test_mac_equality_and_serde() {
        let a = MacAddress::parse("aa:bb:cc:dd:ee:ff").unwrap();
        let b = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();
        let c = MacAddress::parse("11:22:33:44:55:66").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"AA:BB:CC:DD:EE:FF\"");
        let back: MacAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[rstest]
    #[case(26, WiegandFormat::W26, 24, true)]
    #[case(34, WiegandFormat::W34, 32, true)]
    #[case(40, WiegandFormat::Em4100, 40, false)]
    fn test_format_from_bit_count(
        #[case] bits: u8,
        #[case] expected: WiegandFormat,
        #[case] data_bits: u8,
        #[case] has_parity: bool,
    ) {
        let format = WiegandFormat::from_bit_count(bits).unwrap();
        assert_eq!(format, expected);
        assert_eq!(format.bit_count(), bits);
        assert_eq!(format.data_bits(), data_bits);
        assert_eq!(format.has_parity(), has_parity);
    }

    #[rstest]
    #[case(0)]
    #[case(25)]
    #[case(32)]
    #[case(37)]
    #[case(64)]
    fn test_format_rejects_unsupported_bit_counts(#[case] bits: u8) {
        let err = WiegandFormat::from_bit_count(bits).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBitLength { bits: b } if b == bits));
    }

    #[test]
    fn test_credential_packing() {
        let w26 = Credential::Wiegand26 {
            facility: 123,
            card: 52719,
        };
        assert_eq!(w26.packed(), 0x7BCDEF);

        let w34 = Credential::Wiegand34 {
            facility: 14507,
            card: 52719,
        };
        assert_eq!(w34.packed(), 0x38AB_CDEF);

        let em = Credential::Em4100 {
            version: 0x01,
            card_id: 0x1234_5678,
        };
        assert_eq!(em.packed(), 0x01_1234_5678);
    }

    #[test]
    fn test_format_data_mask() {
        assert_eq!(WiegandFormat::W26.data_mask(), 0xFF_FFFF);
        assert_eq!(WiegandFormat::W34.data_mask(), 0xFFFF_FFFF);
        assert_eq!(WiegandFormat::Em4100.data_mask(), 0xFF_FFFF_FFFF);
    }
}
