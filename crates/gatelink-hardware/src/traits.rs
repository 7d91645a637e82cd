//! Output-line trait definitions.
//!
//! These two traits are the contract between the Wiegand transmitter and a
//! hardware backend. Both are synchronous and blocking: the transmitter
//! depends on nothing happening between a pin write and the delay that
//! follows it.

/// A digital output line.
///
/// Implementations must have the pin configured as an output before the
/// transmitter sees it; the transmitter drives the line to idle HIGH at
/// construction and restores idle HIGH after every pulse.
///
/// # Safety Invariants
///
/// - Only one owner per line instance.
/// - No concurrent access to the same line from multiple contexts.
/// - A write takes effect before the call returns (no buffering).
///
/// Line drive is infallible at this level: on the targets this crate
/// serves, writing a configured output pin cannot meaningfully fail, and a
/// fallible signature would push unreachable error arms into the
/// timing-critical pulse loop.
pub trait OutputPin {
    /// Drive the line high (idle).
    fn set_high(&mut self);

    /// Drive the line low (active).
    fn set_low(&mut self);
}

/// A blocking microsecond delay source.
///
/// `delay_us` must not yield, sleep via the scheduler, or otherwise give up
/// the thread: it is the timing element between a Wiegand pulse's edges,
/// and tolerances are measured in tens of microseconds. See
/// [`SpinDelay`](crate::spin::SpinDelay) for the hosted implementation and
/// [`mock::MockDelay`](crate::mock::MockDelay) for the test clock.
pub trait DelayUs {
    /// Block the calling thread for `us` microseconds.
    fn delay_us(&mut self, us: u32);
}
