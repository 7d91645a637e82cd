//! Wiegand/EM4100 credential transmission.
//!
//! This crate turns a numeric credential into a correctly parity-protected,
//! correctly timed sequence of electrical pulses on two output lines, in the
//! 26-bit, 34-bit, or 40-bit EM4100-style format.
//!
//! # Wire format
//!
//! ```text
//! 26-bit:  [E][ 8-bit facility ][   16-bit card    ][O]
//! 34-bit:  [E][      16-bit facility ][ 16-bit card ][O]
//! 40-bit:  [ 8-bit version ][       32-bit card id       ]   (no parity)
//! ```
//!
//! `E` is even parity over the upper half of the data bits, `O` is odd
//! parity over the lower half. Data bits go out most-significant first.
//! Each bit is a 50 µs active-low pulse on D0 (for 0) or D1 (for 1),
//! followed by a 1000 µs idle interval.
//!
//! # Layering
//!
//! - [`parity`]: the half-split parity arithmetic.
//! - [`frame`]: validated, wire-ordered bit sequences ([`WiegandFrame`]).
//! - [`transmitter`]: the timed pulse driver ([`WiegandTransmitter`]),
//!   generic over the [`OutputPin`]/[`DelayUs`] backend.
//!
//! Encoding is pure and testable without hardware; the transmitter adds
//! nothing but timing. A send blocks its thread for the full pulse train
//! (about 27 ms for 26 bits up to 42 ms for 40); see the scheduling notes on
//! [`WiegandTransmitter`].
//!
//! [`OutputPin`]: gatelink_hardware::OutputPin
//! [`DelayUs`]: gatelink_hardware::DelayUs

pub mod frame;
pub mod parity;
pub mod transmitter;

pub use frame::WiegandFrame;
pub use transmitter::{Transmission, WiegandTransmitter};
