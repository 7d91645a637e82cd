//! Output-line abstraction for the Gatelink Wiegand transmitter.
//!
//! This crate defines the narrow electrical surface the transmitter drives:
//! two digital output lines and a microsecond-resolution blocking delay.
//! Everything above it (framing, parity, pulse sequencing) is pure logic in
//! `gatelink-wiegand`; everything below it is a backend.
//!
//! # Design Philosophy
//!
//! - **Synchronous by contract**: Wiegand timing tolerances are tight enough
//!   that a suspension point between a pulse's falling and rising edge can
//!   corrupt the signal. [`OutputPin`] and [`DelayUs`] are deliberately
//!   blocking traits; the async world ends at the transmitter's caller.
//! - **Infallible line drive**: setting a configured output pin high or low
//!   cannot meaningfully fail on the targets this crate serves, so the pin
//!   methods return nothing. Misconfiguration (the same physical pin on both
//!   lines) is rejected earlier, at [`PinAssignment`] construction.
//! - **Mock-first**: the [`mock`] module ships a virtual-clock line pair
//!   precise to the microsecond, so protocol timing is asserted
//!   deterministically in tests without real hardware or real waiting.
//!
//! Real GPIO backends (e.g. memory-mapped or character-device drivers) are
//! reserved behind the `backend-*` cargo features.

pub mod error;
pub mod mock;
pub mod spin;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use spin::SpinDelay;
pub use traits::{DelayUs, OutputPin};
pub use types::{Level, Line, PinAssignment};
