//! Per-device transmission cooldown.

use gatelink_core::MacAddress;
use gatelink_core::constants::DEFAULT_COOLDOWN_MS;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Rate limiter preventing one device from retriggering the reader.
///
/// A BLE device advertises continuously, so without a cooldown a single
/// phone standing at the door would stream credentials at the controller
/// several times a second. The tracker grants at most one transmission per
/// device per window.
///
/// Time is passed in explicitly on the `_at` variants so behavior is
/// testable without waiting; the plain methods use `Instant::now()`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use gatelink_core::MacAddress;
/// use gatelink_presence::CooldownTracker;
///
/// let mut cooldown = CooldownTracker::new(Duration::from_secs(5));
/// let mac = MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap();
///
/// assert!(cooldown.try_acquire(&mac));
/// assert!(!cooldown.try_acquire(&mac)); // within the window
/// ```
#[derive(Debug)]
pub struct CooldownTracker {
    window: Duration,
    last_grant: HashMap<MacAddress, Instant>,
}

impl CooldownTracker {
    /// Create a tracker with the given window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        CooldownTracker {
            window,
            last_grant: HashMap::new(),
        }
    }

    /// The configured window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to acquire a transmission slot for `mac` now.
    ///
    /// Returns `true` (and starts the device's window) if the device has
    /// no grant inside the window; `false` otherwise.
    pub fn try_acquire(&mut self, mac: &MacAddress) -> bool {
        self.try_acquire_at(mac, Instant::now())
    }

    /// Try to acquire a transmission slot at an explicit instant.
    pub fn try_acquire_at(&mut self, mac: &MacAddress, now: Instant) -> bool {
        if let Some(last) = self.last_grant.get(mac)
            && now.duration_since(*last) < self.window
        {
            return false;
        }
        self.last_grant.insert(*mac, now);
        true
    }

    /// Time left in `mac`'s window at `now`, if it is cooling down.
    #[must_use]
    pub fn remaining_at(&self, mac: &MacAddress, now: Instant) -> Option<Duration> {
        let last = self.last_grant.get(mac)?;
        let elapsed = now.duration_since(*last);
        (elapsed < self.window).then(|| self.window - elapsed)
    }

    /// Drop bookkeeping for devices whose window has fully elapsed.
    ///
    /// The tracker otherwise grows by one entry per distinct device ever
    /// seen; callers that run for weeks should purge periodically.
    pub fn purge_expired_at(&mut self, now: Instant) {
        let window = self.window;
        self.last_grant
            .retain(|_, last| now.duration_since(*last) < window);
    }

    /// Number of devices currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last_grant.len()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COOLDOWN_MS))
    }
}
