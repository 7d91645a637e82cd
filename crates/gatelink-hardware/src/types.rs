//! Shared hardware-level types.

use crate::error::{HardwareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Driven low (the active state of a Wiegand pulse).
    Low,
    /// Driven high (the idle state of both data lines).
    High,
}

/// Which of the two Wiegand data lines a signal belongs to.
///
/// By protocol convention D0 pulses encode a `0` bit and D1 pulses encode
/// a `1` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    D0,
    D1,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::D0 => write!(f, "D0"),
            Line::D1 => write!(f, "D1"),
        }
    }
}

/// Physical pin assignment for the D0/D1 line pair.
///
/// Configured once and never reassigned for the life of a transmitter.
/// Construction rejects assigning both lines to the same pin; that is an
/// electrical misconfiguration no later check could recover from.
///
/// # Examples
///
/// ```
/// use gatelink_hardware::PinAssignment;
///
/// let pins = PinAssignment::new(25, 26).unwrap();
/// assert_eq!(pins.d0(), 25);
/// assert_eq!(pins.d1(), 26);
///
/// assert!(PinAssignment::new(25, 25).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPinAssignment")]
pub struct PinAssignment {
    d0: u8,
    d1: u8,
}

impl PinAssignment {
    /// Create a pin assignment with validation.
    ///
    /// # Errors
    /// Returns `HardwareError::ConflictingLines` if both lines name the
    /// same pin.
    pub fn new(d0: u8, d1: u8) -> Result<Self> {
        if d0 == d1 {
            return Err(HardwareError::conflicting_lines(d0));
        }
        Ok(PinAssignment { d0, d1 })
    }

    /// Pin number carrying the D0 line.
    #[must_use]
    pub fn d0(&self) -> u8 {
        self.d0
    }

    /// Pin number carrying the D1 line.
    #[must_use]
    pub fn d1(&self) -> u8 {
        self.d1
    }
}

/// Default assignment: D0 on pin 25, D1 on pin 26.
impl Default for PinAssignment {
    fn default() -> Self {
        PinAssignment { d0: 25, d1: 26 }
    }
}

impl fmt::Display for PinAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D0=pin{} D1=pin{}", self.d0, self.d1)
    }
}

#[derive(Deserialize)]
struct RawPinAssignment {
    d0: u8,
    d1: u8,
}

impl TryFrom<RawPinAssignment> for PinAssignment {
    type Error = HardwareError;

    fn try_from(raw: RawPinAssignment) -> Result<Self> {
        PinAssignment::new(raw.d0, raw.d1)
    }
}
