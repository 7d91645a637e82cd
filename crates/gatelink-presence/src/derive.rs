//! MAC-address-to-credential derivation.
//!
//! A BLE device has no card number, so the bridge derives one from the
//! device's MAC address deterministically. The mapping per format:
//!
//! | Format | Facility / version source | Card source          |
//! |--------|---------------------------|----------------------|
//! | 26-bit | static configured value   | octets 5–6           |
//! | 34-bit | octets 3–4                | octets 5–6           |
//! | EM4100 | octet 1 (version)         | octets 2–5 (card id) |
//!
//! The mapping is stable across restarts by construction, which is what
//! lets an operator pre-register the derived numbers in the downstream
//! controller (see the `derive` CLI subcommand).

use gatelink_core::constants::DEFAULT_FACILITY_CODE;
use gatelink_core::{Credential, MacAddress, WiegandFormat};
use serde::{Deserialize, Serialize};

/// Which credential a MAC address maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPolicy {
    /// Output format for derived credentials.
    pub format: WiegandFormat,

    /// Static facility code used by the 26-bit format (the other formats
    /// derive their high field from the MAC itself).
    pub facility_code: u8,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        CredentialPolicy {
            format: WiegandFormat::W26,
            facility_code: DEFAULT_FACILITY_CODE,
        }
    }
}

/// Derive the credential a device presents under the given policy.
///
/// # Examples
///
/// ```
/// use gatelink_core::{Credential, MacAddress, WiegandFormat};
/// use gatelink_presence::{CredentialPolicy, derive_credential};
///
/// let mac = MacAddress::parse("A4:C1:38:AB:CD:EF").unwrap();
/// let policy = CredentialPolicy { format: WiegandFormat::W26, facility_code: 123 };
///
/// assert_eq!(
///     derive_credential(&mac, &policy),
///     Credential::Wiegand26 { facility: 123, card: 52719 },
/// );
/// ```
#[must_use]
pub fn derive_credential(mac: &MacAddress, policy: &CredentialPolicy) -> Credential {
    match policy.format {
        WiegandFormat::W26 => Credential::Wiegand26 {
            facility: policy.facility_code,
            card: mac.tail_u16(),
        },
        WiegandFormat::W34 => Credential::Wiegand34 {
            facility: mac.mid_u16(),
            card: mac.tail_u16(),
        },
        WiegandFormat::Em4100 => Credential::Em4100 {
            version: mac.head_u8(),
            card_id: mac.body_u32(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mac() -> MacAddress {
        MacAddress::parse("A4:C1:38:AB:CD:EF").unwrap()
    }

    #[test]
    fn test_derive_w26_uses_static_facility_and_mac_tail() {
        let policy = CredentialPolicy {
            format: WiegandFormat::W26,
            facility_code: 123,
        };
        assert_eq!(
            derive_credential(&mac(), &policy),
            Credential::Wiegand26 {
                facility: 123,
                card: 52719
            }
        );
    }

    #[test]
    fn test_derive_w34_takes_both_fields_from_mac() {
        let policy = CredentialPolicy {
            format: WiegandFormat::W34,
            facility_code: 0,
        };
        assert_eq!(
            derive_credential(&mac(), &policy),
            Credential::Wiegand34 {
                facility: 14507,
                card: 52719
            }
        );
    }

    #[test]
    fn test_derive_em4100_takes_version_and_body_from_mac() {
        let policy = CredentialPolicy {
            format: WiegandFormat::Em4100,
            facility_code: 0,
        };
        assert_eq!(
            derive_credential(&mac(), &policy),
            Credential::Em4100 {
                version: 0xA4,
                card_id: 0xC138_ABCD
            }
        );
    }

    #[rstest]
    #[case(WiegandFormat::W26)]
    #[case(WiegandFormat::W34)]
    #[case(WiegandFormat::Em4100)]
    fn test_derivation_is_deterministic(#[case] format: WiegandFormat) {
        let policy = CredentialPolicy {
            format,
            facility_code: 7,
        };
        assert_eq!(
            derive_credential(&mac(), &policy),
            derive_credential(&mac(), &policy)
        );
    }

    #[test]
    fn test_default_policy() {
        let policy = CredentialPolicy::default();
        assert_eq!(policy.format, WiegandFormat::W26);
        assert_eq!(policy.facility_code, DEFAULT_FACILITY_CODE);
    }
}
