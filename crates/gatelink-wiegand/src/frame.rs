//! Wire-ordered Wiegand bit sequences.

use crate::parity::{even_parity_bit, odd_parity_bit};
use gatelink_core::{Credential, Result, WiegandFormat};

/// A validated, fully framed bit sequence ready for transmission.
///
/// A frame is the pure-data half of a transmission: the payload masked to
/// the format's width, the parity bits (when the format carries them), and
/// the exact wire order. Building a frame never touches hardware, so every
/// encoding property can be asserted without a transmitter.
///
/// # Examples
///
/// ```
/// use gatelink_core::Credential;
/// use gatelink_wiegand::WiegandFrame;
///
/// let frame = WiegandFrame::encode(&Credential::Wiegand26 {
///     facility: 123,
///     card: 52719,
/// });
///
/// assert_eq!(frame.len(), 26);
/// assert_eq!(frame.even_parity(), Some(false));
/// assert_eq!(frame.odd_parity(), Some(true));
/// assert_eq!(frame.bit_string(), "00111101111001101111011111");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WiegandFrame {
    format: WiegandFormat,
    data: u64,
    even_parity: Option<bool>,
    odd_parity: Option<bool>,
}

impl WiegandFrame {
    /// Encode a typed credential.
    ///
    /// Infallible: the credential's fields already fit the format by
    /// construction.
    #[must_use]
    pub fn encode(credential: &Credential) -> Self {
        Self::build(credential.format(), credential.packed())
    }

    /// Encode a pre-packed payload at an explicit bit count.
    ///
    /// This is the fire-and-forget entry point for callers that carry the
    /// payload already packed. The payload is masked to the format's
    /// data-bit count; bits above it are ignored.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedBitLength` for any `bits` outside
    /// {26, 34, 40}. No partial frame is produced.
    pub fn from_raw(data: u64, bits: u8) -> Result<Self> {
        let format = WiegandFormat::from_bit_count(bits)?;
        Ok(Self::build(format, data))
    }

    fn build(format: WiegandFormat, data: u64) -> Self {
        let data = data & format.data_mask();
        let (even_parity, odd_parity) = if format.has_parity() {
            (
                Some(even_parity_bit(data, format.data_bits())),
                Some(odd_parity_bit(data, format.data_bits())),
            )
        } else {
            (None, None)
        };

        WiegandFrame {
            format,
            data,
            even_parity,
            odd_parity,
        }
    }

    /// The frame's wire format.
    #[must_use]
    pub fn format(&self) -> WiegandFormat {
        self.format
    }

    /// The masked payload.
    #[must_use]
    pub fn data(&self) -> u64 {
        self.data
    }

    /// The leading even-parity bit, `None` for the parity-free format.
    #[must_use]
    pub fn even_parity(&self) -> Option<bool> {
        self.even_parity
    }

    /// The trailing odd-parity bit, `None` for the parity-free format.
    #[must_use]
    pub fn odd_parity(&self) -> Option<bool> {
        self.odd_parity
    }

    /// Total bits on the wire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.format.bit_count() as usize
    }

    /// A frame always carries at least one bit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the bits in exact wire order.
    ///
    /// Order is `[even parity]? data(MSB -> LSB) [odd parity]?`. The
    /// iterator is lazy and allocation-free; the transmitter drives pulses
    /// straight off it.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        let data = self.data;
        self.even_parity
            .into_iter()
            .chain(
                (0..self.format.data_bits())
                    .rev()
                    .map(move |i| (data >> i) & 1 == 1),
            )
            .chain(self.odd_parity)
    }

    /// The wire sequence as a `0`/`1` string, for diagnostics.
    #[must_use]
    pub fn bit_string(&self) -> String {
        self.bits().map(|b| if b { '1' } else { '0' }).collect()
    }
}
