//! The timed Wiegand pulse driver.

use crate::frame::WiegandFrame;
use gatelink_core::constants::{PULSE_INTERVAL_US, PULSE_WIDTH_US};
use gatelink_core::{Credential, Result, WiegandFormat};
use gatelink_hardware::{DelayUs, OutputPin};
use serde::Serialize;
use tracing::{debug, warn};

/// Summary of a completed transmission.
///
/// Assembled from the frame before the timed region starts and handed back
/// (and logged, when diagnostics are enabled) only after the final pulse,
/// so producing it can never perturb the wire signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transmission {
    /// The wire format used.
    pub format: WiegandFormat,

    /// The masked payload that went out.
    pub data: u64,

    /// Leading even-parity bit, absent for the parity-free format.
    pub even_parity: Option<bool>,

    /// Trailing odd-parity bit, absent for the parity-free format.
    pub odd_parity: Option<bool>,

    /// The literal bit sequence, in wire order.
    pub bit_string: String,

    /// Number of pulses placed on the lines.
    pub bits_sent: usize,

    /// Echo of the caller's facility-code flag. Informational only; it
    /// never alters encoding.
    pub with_facility_code: bool,
}

impl Transmission {
    fn from_frame(frame: &WiegandFrame, with_facility_code: bool) -> Self {
        Transmission {
            format: frame.format(),
            data: frame.data(),
            even_parity: frame.even_parity(),
            odd_parity: frame.odd_parity(),
            bit_string: frame.bit_string(),
            bits_sent: frame.len(),
            with_facility_code,
        }
    }
}

/// Wiegand/EM4100 transmitter over a pair of output lines.
///
/// Owns the D0/D1 lines exclusively for its lifetime. Construction drives
/// both lines to idle HIGH; every send restores idle HIGH before it
/// returns. Exactly one transmission is ever in flight: the send methods
/// take `&mut self` and block the calling thread for the full pulse train
/// (about 1.05 ms per bit).
///
/// # Scheduling contract
///
/// The pulse loop is a non-yielding critical section. It performs no
/// allocation, formatting, logging, or I/O between the first falling edge
/// and the last rising edge, only pin writes and [`DelayUs`] waits.
/// Callers that live in an async world must hop onto a blocking-capable
/// thread before sending; the transmitter will not do it for them.
///
/// There is no queueing, retry, or cancellation. A call either completes
/// the whole bit sequence or fails validation before emitting any pulse.
///
/// # Examples
///
/// ```
/// use gatelink_hardware::mock::MockLinePair;
/// use gatelink_wiegand::WiegandTransmitter;
///
/// let (d0, d1, delay, probe) = MockLinePair::new();
/// let mut tx = WiegandTransmitter::new(d0, d1, delay);
///
/// let sent = tx.send26(123, 52719);
/// assert_eq!(sent.bits_sent, 26);
/// assert_eq!(probe.pulse_count(), 26);
/// assert!(probe.lines_idle());
/// ```
#[derive(Debug)]
pub struct WiegandTransmitter<P: OutputPin, D: DelayUs> {
    d0: P,
    d1: P,
    delay: D,
    diagnostics: bool,
}

impl<P: OutputPin, D: DelayUs> WiegandTransmitter<P, D> {
    /// Create a transmitter and drive both lines to idle HIGH.
    pub fn new(mut d0: P, mut d1: P, delay: D) -> Self {
        d0.set_high();
        d1.set_high();
        WiegandTransmitter {
            d0,
            d1,
            delay,
            diagnostics: false,
        }
    }

    /// Enable or disable the diagnostic trace.
    ///
    /// When enabled, each completed transmission is logged at debug level
    /// after the timing-critical region, never inside it.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Send a single bit: pull the matching line low for the pulse width,
    /// restore it, then hold the inter-pulse interval.
    ///
    /// D0 carries 0s, D1 carries 1s; the other line stays at idle HIGH
    /// throughout.
    fn send_bit(&mut self, bit: bool) {
        let line = if bit { &mut self.d1 } else { &mut self.d0 };
        line.set_low();
        self.delay.delay_us(PULSE_WIDTH_US);
        line.set_high();
        self.delay.delay_us(PULSE_INTERVAL_US);
    }

    /// Transmit an already validated frame.
    fn send_frame(&mut self, frame: &WiegandFrame, with_facility_code: bool) -> Transmission {
        let summary = Transmission::from_frame(frame, with_facility_code);

        // Timing-critical region: pin writes and delays only.
        for bit in frame.bits() {
            self.send_bit(bit);
        }

        if self.diagnostics {
            let data_hex = format!("0x{:X}", summary.data);
            debug!(
                format = %summary.format,
                data = %data_hex,
                even_parity = ?summary.even_parity,
                odd_parity = ?summary.odd_parity,
                bits = %summary.bit_string,
                "transmission complete"
            );
        }

        summary
    }

    /// Send a pre-packed payload at an explicit bit count.
    ///
    /// `with_facility_code` is accepted for interface symmetry with the
    /// convenience operations and echoed into the returned summary; it does
    /// not alter encoding.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedBitLength` for any `bits` outside
    /// {26, 34, 40}. On the error path zero pulses are emitted and both
    /// lines remain at idle HIGH.
    pub fn send_raw(
        &mut self,
        data: u64,
        bits: u8,
        with_facility_code: bool,
    ) -> Result<Transmission> {
        let frame = WiegandFrame::from_raw(data, bits).inspect_err(|err| {
            warn!(bits, "transmission rejected: {err}");
        })?;
        Ok(self.send_frame(&frame, with_facility_code))
    }

    /// Send a typed credential.
    pub fn send(&mut self, credential: &Credential) -> Transmission {
        let frame = WiegandFrame::encode(credential);
        self.send_frame(&frame, true)
    }

    /// Send a 26-bit Wiegand credential: 8-bit facility code in bits
    /// 16–23, 16-bit card number in bits 0–15.
    pub fn send26(&mut self, facility: u8, card: u16) -> Transmission {
        self.send(&Credential::Wiegand26 { facility, card })
    }

    /// Send a 34-bit Wiegand credential: 16-bit facility code in bits
    /// 16–31, 16-bit card number in bits 0–15.
    pub fn send34(&mut self, facility: u16, card: u16) -> Transmission {
        self.send(&Credential::Wiegand34 { facility, card })
    }

    /// Send a 40-bit EM4100 credential: 8-bit version in bits 32–39,
    /// 32-bit card id in bits 0–31, no parity framing.
    pub fn send_em4100(&mut self, version: u8, card_id: u32) -> Transmission {
        self.send(&Credential::Em4100 { version, card_id })
    }

    /// Tear down, returning the owned pins and delay source.
    #[must_use]
    pub fn into_parts(self) -> (P, P, D) {
        (self.d0, self.d1, self.delay)
    }
}
