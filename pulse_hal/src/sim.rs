//! Software models of the counting peripherals.
//!
//! Each model is split into a shared state (atomics, usable from a `static` or a leaked box)
//! and a thin handle implementing the peripheral trait. The handle is moved into the
//! frequency counter while the test keeps a reference to the state to inject input
//! transitions, advance time and inspect the configuration.
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use super::{EdgeNotifier, Instant, PulseCounter, Timebase};

/// State of a simulated counting register of `bits` width.
pub struct CounterState {
    bits: u32,
    count: AtomicU32,
    running: AtomicBool,
    listening: AtomicBool,
    pending: AtomicBool,
}

impl CounterState {
    pub const fn new(bits: u32) -> Self {
        Self {
            bits,
            count: AtomicU32::new(0),
            running: AtomicBool::new(false),
            listening: AtomicBool::new(false),
            pending: AtomicBool::new(false),
        }
    }

    /// Apply one input transition.
    ///
    /// # Returns
    /// True if the transition wrapped the register with the overflow interrupt enabled, i.e.
    /// the overflow handler is due. The overflow stays pending until the handler (or any
    /// other caller of [`PulseCounter::take_overflow`]) acknowledges it.
    pub fn pulse(&self) -> bool {
        if !self.running.load(Ordering::Relaxed) {
            return false;
        }
        let mask = (1u32 << self.bits) - 1;
        let count = self.count.load(Ordering::Relaxed).wrapping_add(1) & mask;
        self.count.store(count, Ordering::Relaxed);
        if count != 0 {
            return false;
        }
        self.pending.store(true, Ordering::Relaxed);
        self.irq_pending()
    }

    /// Check whether the overflow interrupt is asserted.
    pub fn irq_pending(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
            && self.pending.load(Ordering::Relaxed)
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

/// Simulated counting register with `BITS` width.
pub struct SimCounter<'a, const BITS: u32> {
    state: &'a CounterState,
}

impl<'a, const BITS: u32> SimCounter<'a, BITS> {
    pub fn new(state: &'a CounterState) -> Self {
        assert_eq!(state.bits, BITS);
        Self { state }
    }
}

impl<const BITS: u32> PulseCounter for SimCounter<'_, BITS> {
    const BITS: u32 = BITS;

    fn start(&mut self) {
        self.state.running.store(true, Ordering::Relaxed);
    }

    fn stop(&mut self) {
        self.state.running.store(false, Ordering::Relaxed);
    }

    fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn count(&self) -> u32 {
        self.state.count()
    }

    fn set_count(&mut self, count: u32) {
        self.state
            .count
            .store(count & ((1u32 << BITS) - 1), Ordering::Relaxed);
    }

    fn listen(&mut self) {
        self.state.listening.store(true, Ordering::Relaxed);
    }

    fn unlisten(&mut self) {
        self.state.listening.store(false, Ordering::Relaxed);
    }

    fn take_overflow(&mut self) -> bool {
        self.state.pending.swap(false, Ordering::Relaxed)
    }
}

/// State of a simulated microsecond clock.
pub struct ClockState {
    micros: AtomicU32,
}

impl ClockState {
    pub const fn new() -> Self {
        Self {
            micros: AtomicU32::new(0),
        }
    }

    pub fn set(&self, micros: u32) {
        self.micros.store(micros, Ordering::Relaxed);
    }

    pub fn advance(&self, micros: u32) {
        self.micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn micros(&self) -> u32 {
        self.micros.load(Ordering::Relaxed)
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SimClock<'a> {
    state: &'a ClockState,
}

impl<'a> SimClock<'a> {
    pub fn new(state: &'a ClockState) -> Self {
        Self { state }
    }
}

impl Timebase for SimClock<'_> {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.state.micros())
    }
}

/// State of a simulated pin-change notifier.
pub struct EdgeState {
    mask: AtomicU8,
}

impl EdgeState {
    pub const fn new() -> Self {
        Self {
            mask: AtomicU8::new(0),
        }
    }

    /// The currently subscribed pin mask (zero if unsubscribed).
    pub fn mask(&self) -> u8 {
        self.mask.load(Ordering::Relaxed)
    }
}

impl Default for EdgeState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SimEdges<'a> {
    state: &'a EdgeState,
}

impl<'a> SimEdges<'a> {
    pub fn new(state: &'a EdgeState) -> Self {
        Self { state }
    }
}

impl EdgeNotifier for SimEdges<'_> {
    fn subscribe(&mut self, mask: u8) {
        self.state.mask.store(mask, Ordering::Relaxed);
    }

    fn unsubscribe(&mut self) {
        self.state.mask.store(0, Ordering::Relaxed);
    }
}
