//! Mock line pair for testing and emulation.
//!
//! This module simulates the D0/D1 output lines on a shared virtual
//! microsecond clock. The delay source advances the clock instead of
//! blocking, and every line level change is recorded against the clock, so a test
//! can reconstruct the exact waveform a transmission produced (pulse
//! widths, inter-pulse gaps, line selection, ordering) without real time
//! passing.
//!
//! Following the device/probe split used throughout the workspace's mocks,
//! construction hands the pins and delay to the transmitter and keeps a
//! [`LineProbe`] behind for inspection:
//!
//! ```
//! use gatelink_hardware::mock::MockLinePair;
//! use gatelink_hardware::{DelayUs, OutputPin};
//!
//! let (mut d0, _d1, mut delay, probe) = MockLinePair::new();
//!
//! d0.set_high();
//! d0.set_low();
//! delay.delay_us(50);
//! d0.set_high();
//!
//! let pulses = probe.pulses();
//! assert_eq!(pulses.len(), 1);
//! assert_eq!(pulses[0].width_us, 50);
//! ```

use crate::traits::{DelayUs, OutputPin};
use crate::types::{Level, Line};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Shared virtual clock counting elapsed microseconds.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock(Arc<AtomicU64>);

impl VirtualClock {
    /// Create a clock at t = 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in microseconds.
    #[must_use]
    pub fn now_us(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Advance the clock.
    pub fn advance_us(&self, us: u32) {
        self.0.fetch_add(us as u64, Ordering::SeqCst);
    }
}

/// [`DelayUs`] implementation that advances the virtual clock instantly.
#[derive(Debug, Clone)]
pub struct MockDelay {
    clock: VirtualClock,
}

impl MockDelay {
    /// Create a delay source over an existing clock.
    #[must_use]
    pub fn new(clock: VirtualClock) -> Self {
        MockDelay { clock }
    }
}

impl DelayUs for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.clock.advance_us(us);
    }
}

/// A single recorded level change on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Which line changed.
    pub line: Line,
    /// The level the line was driven to.
    pub level: Level,
    /// Virtual timestamp of the write, in microseconds.
    pub at_us: u64,
}

/// A reconstructed active-low pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    /// The line that pulsed.
    pub line: Line,
    /// Virtual time of the falling edge.
    pub start_us: u64,
    /// Duration the line stayed low.
    pub width_us: u64,
}

impl Pulse {
    /// The bit value this pulse encodes on the wire (D0 = 0, D1 = 1).
    #[must_use]
    pub fn bit(&self) -> bool {
        self.line == Line::D1
    }
}

type TransitionLog = Arc<Mutex<Vec<Transition>>>;

/// Mock output pin recording level changes against the virtual clock.
///
/// Writes are recorded only when they change the line's level, matching
/// what an oscilloscope on the physical line would see. The pin starts at
/// [`Level::Low`] (unpowered) so the transmitter's idle-HIGH initialization
/// is itself observable.
#[derive(Debug)]
pub struct MockPin {
    line: Line,
    level: Level,
    clock: VirtualClock,
    log: TransitionLog,
}

impl MockPin {
    fn new(line: Line, clock: VirtualClock, log: TransitionLog) -> Self {
        MockPin {
            line,
            level: Level::Low,
            clock,
            log,
        }
    }

    /// Current level of the line.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    fn record(&mut self, level: Level) {
        if self.level == level {
            return;
        }
        self.level = level;
        self.log
            .lock()
            .expect("transition log poisoned")
            .push(Transition {
                line: self.line,
                level,
                at_us: self.clock.now_us(),
            });
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.record(Level::High);
    }

    fn set_low(&mut self) {
        self.record(Level::Low);
    }
}

/// Factory for a complete mock line pair.
pub struct MockLinePair;

impl MockLinePair {
    /// Create the D0/D1 pins, the matching delay source, and the probe.
    ///
    /// All four share one virtual clock and one transition log.
    #[must_use]
    pub fn new() -> (MockPin, MockPin, MockDelay, LineProbe) {
        let clock = VirtualClock::new();
        let log: TransitionLog = Arc::new(Mutex::new(Vec::new()));

        let d0 = MockPin::new(Line::D0, clock.clone(), Arc::clone(&log));
        let d1 = MockPin::new(Line::D1, clock.clone(), Arc::clone(&log));
        let delay = MockDelay::new(clock.clone());
        let probe = LineProbe { clock, log };

        (d0, d1, delay, probe)
    }
}

/// Inspection handle over a mock line pair's recorded waveform.
#[derive(Debug, Clone)]
pub struct LineProbe {
    clock: VirtualClock,
    log: TransitionLog,
}

impl LineProbe {
    /// All recorded transitions in chronological order.
    #[must_use]
    pub fn transitions(&self) -> Vec<Transition> {
        self.log.lock().expect("transition log poisoned").clone()
    }

    /// Current virtual time in microseconds.
    #[must_use]
    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    /// Discard the recorded history (keeps the clock running).
    pub fn clear(&self) {
        self.log.lock().expect("transition log poisoned").clear();
    }

    /// Reconstruct the active-low pulses from the transition record.
    ///
    /// A pulse is a low write followed by the next high write on the same
    /// line. The initial idle-HIGH initialization writes produce no pulse.
    #[must_use]
    pub fn pulses(&self) -> Vec<Pulse> {
        let transitions = self.transitions();
        let mut pulses = Vec::new();
        let mut open: [Option<u64>; 2] = [None, None];

        for t in &transitions {
            let slot = match t.line {
                Line::D0 => 0,
                Line::D1 => 1,
            };
            match t.level {
                Level::Low => open[slot] = Some(t.at_us),
                Level::High => {
                    if let Some(start_us) = open[slot].take() {
                        pulses.push(Pulse {
                            line: t.line,
                            start_us,
                            width_us: t.at_us - start_us,
                        });
                    }
                }
            }
        }

        pulses
    }

    /// Number of complete pulses recorded across both lines.
    #[must_use]
    pub fn pulse_count(&self) -> usize {
        self.pulses().len()
    }

    /// The bit sequence the recorded pulses encode (D0 = 0, D1 = 1).
    #[must_use]
    pub fn bits(&self) -> Vec<bool> {
        self.pulses().iter().map(Pulse::bit).collect()
    }

    /// Returns `true` if both lines currently rest at idle HIGH.
    ///
    /// A line that was never written counts as not idle: the transmitter
    /// is required to initialize both lines explicitly.
    #[must_use]
    pub fn lines_idle(&self) -> bool {
        let transitions = self.transitions();
        let last_level = |line: Line| {
            transitions
                .iter()
                .rev()
                .find(|t| t.line == line)
                .map(|t| t.level)
        };
        last_level(Line::D0) == Some(Level::High) && last_level(Line::D1) == Some(Level::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_advances() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now_us(), 0);
        clock.advance_us(50);
        clock.advance_us(1000);
        assert_eq!(clock.now_us(), 1050);
    }

    #[test]
    fn test_mock_delay_advances_shared_clock() {
        let clock = VirtualClock::new();
        let mut delay = MockDelay::new(clock.clone());
        delay.delay_us(250);
        assert_eq!(clock.now_us(), 250);
    }

    #[test]
    fn test_pin_records_only_level_changes() {
        let (mut d0, _d1, _delay, probe) = MockLinePair::new();

        d0.set_high();
        d0.set_high(); // no-op, already high
        d0.set_low();
        d0.set_high();

        let transitions = probe.transitions();
        assert_eq!(transitions.len(), 3);
        assert_eq!(transitions[0].level, Level::High);
        assert_eq!(transitions[1].level, Level::Low);
        assert_eq!(transitions[2].level, Level::High);
    }

    #[test]
    fn test_pulse_reconstruction() {
        let (mut d0, mut d1, mut delay, probe) = MockLinePair::new();

        d0.set_high();
        d1.set_high();

        // A 0 bit then a 1 bit at the protocol cadence.
        d0.set_low();
        delay.delay_us(50);
        d0.set_high();
        delay.delay_us(1000);
        d1.set_low();
        delay.delay_us(50);
        d1.set_high();

        let pulses = probe.pulses();
        assert_eq!(pulses.len(), 2);

        assert_eq!(pulses[0].line, Line::D0);
        assert_eq!(pulses[0].start_us, 0);
        assert_eq!(pulses[0].width_us, 50);

        assert_eq!(pulses[1].line, Line::D1);
        assert_eq!(pulses[1].start_us, 1050);
        assert_eq!(pulses[1].width_us, 50);

        assert_eq!(probe.bits(), vec![false, true]);
        assert!(probe.lines_idle());
    }

    #[test]
    fn test_lines_idle_requires_explicit_initialization() {
        let (_d0, _d1, _delay, probe) = MockLinePair::new();
        assert!(!probe.lines_idle());
    }
}
