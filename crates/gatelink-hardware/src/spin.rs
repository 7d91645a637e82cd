//! Busy-wait delay for hosted targets.

use crate::traits::DelayUs;
use std::time::{Duration, Instant};

/// Spin-wait [`DelayUs`] implementation.
///
/// Burns the calling thread in a spin loop until the deadline passes. This
/// is the correct trade for Wiegand pulse timing: an OS sleep has
/// millisecond-class wakeup jitter, which is 20x the entire pulse width.
/// The cost is one core pegged for the duration of a transmission
/// (about 40 ms for the longest format), which the scheduling contract
/// accepts: a send blocks its thread by design.
///
/// For sub-interval precision the spin checks a monotonic clock rather than
/// counting iterations, so it is immune to frequency scaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl SpinDelay {
    /// Create a new spin delay source.
    #[must_use]
    pub fn new() -> Self {
        SpinDelay
    }
}

impl DelayUs for SpinDelay {
    fn delay_us(&mut self, us: u32) {
        let deadline = Instant::now() + Duration::from_micros(us as u64);
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}
