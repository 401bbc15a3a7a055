#![cfg_attr(not(test), no_std)]
//! Peripheral abstractions consumed by the gated frequency counter.
//!
//! # Design
//! A frequency counter needs three pieces of hardware: a counting register clocked by the
//! input signal that raises an interrupt when it wraps, a free-running microsecond clock for
//! period measurements, and (optionally) a pin-change notifier that reports edges on a gate
//! input. Each is modeled by a small trait here so that the measurement engine can be driven
//! by a HAL timer on target and by the [`sim`] models on the host.

use fugit::TimerInstantU32;

/// A microsecond timestamp.
pub type Instant = TimerInstantU32<1_000_000>;

/// A hardware register counting transitions of the input signal.
///
/// The counter counts up and wraps from `(1 << BITS) - 1` to zero. Each wrap raises an
/// overflow flag that stays set until acknowledged with [`PulseCounter::take_overflow`]. While
/// the flag is set and overflow interrupts are enabled, the overflow handler of the frequency
/// counter must run.
pub trait PulseCounter {
    /// Width of the counting register in bits. Must be less than 32.
    const BITS: u32;

    /// Begin counting input transitions.
    fn start(&mut self);

    /// Stop counting. The current count is retained.
    fn stop(&mut self);

    /// Check whether the counter is currently counting.
    fn is_running(&self) -> bool;

    /// Get the current value of the counting register.
    fn count(&self) -> u32;

    /// Load the counting register.
    fn set_count(&mut self, count: u32);

    /// Enable the overflow interrupt.
    fn listen(&mut self);

    /// Disable the overflow interrupt.
    fn unlisten(&mut self);

    /// Acknowledge a pending overflow.
    ///
    /// # Returns
    /// True if the register wrapped since the overflow was last acknowledged. The flag is
    /// raised on every wrap, whether or not the overflow interrupt is enabled.
    fn take_overflow(&mut self) -> bool;

    /// Discard a pending overflow interrupt, if any.
    fn clear_overflow(&mut self) {
        self.take_overflow();
    }

    /// The register value that overflows after exactly `transitions` further input
    /// transitions.
    fn preload(transitions: u32) -> u32 {
        debug_assert!(Self::BITS < 32);
        debug_assert!(transitions > 0 && transitions <= 1 << Self::BITS);
        ((1u32 << Self::BITS) - transitions) & ((1u32 << Self::BITS) - 1)
    }
}

/// A free-running clock with microsecond resolution.
///
/// The clock wraps at the `u32` boundary (just over 71 minutes). Only differences between
/// timestamps are used.
pub trait Timebase {
    fn now(&self) -> Instant;
}

/// Edge subscription on the external gate input.
pub trait EdgeNotifier {
    /// Request pin-change notifications for the pins in `mask`.
    fn subscribe(&mut self, mask: u8);

    /// Cancel all pin-change notifications.
    fn unsubscribe(&mut self);
}

/// Pins that changed state since the last notification.
///
/// Handlers clear the bits they consume so that the remaining bits can be handed to other
/// consumers of the same notification.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PinChanges {
    /// Pins that just went low.
    pub fell: u8,
    /// Pins that just went high.
    pub rose: u8,
}

impl PinChanges {
    pub fn new(fell: u8, rose: u8) -> Self {
        Self { fell, rose }
    }

    /// Consume a falling edge on any pin of `mask`.
    pub fn take_fell(&mut self, mask: u8) -> bool {
        let hit = self.fell & mask != 0;
        self.fell &= !mask;
        hit
    }

    /// Consume a rising edge on any pin of `mask`.
    pub fn take_rose(&mut self, mask: u8) -> bool {
        let hit = self.rose & mask != 0;
        self.rose &= !mask;
        hit
    }
}

#[cfg(feature = "sim")]
pub mod sim;

#[cfg(test)]
mod tests {
    use super::*;

    struct Eight;

    impl PulseCounter for Eight {
        const BITS: u32 = 8;
        fn start(&mut self) {}
        fn stop(&mut self) {}
        fn is_running(&self) -> bool {
            false
        }
        fn count(&self) -> u32 {
            0
        }
        fn set_count(&mut self, _count: u32) {}
        fn listen(&mut self) {}
        fn unlisten(&mut self) {}
        fn take_overflow(&mut self) -> bool {
            false
        }
    }

    #[test]
    fn preload() {
        assert_eq!(Eight::preload(1), 0xff);
        assert_eq!(Eight::preload(10), 246);
        assert_eq!(Eight::preload(100), 156);
        assert_eq!(Eight::preload(256), 0);
    }

    #[test]
    fn consume_changes() {
        let mut changes = PinChanges::new(0b0010_0001, 0b0010_0000);
        assert!(changes.take_fell(1 << 5));
        assert_eq!(changes.fell, 0b0000_0001);
        assert!(!changes.take_fell(1 << 5));
        assert!(changes.take_rose(1 << 5));
        assert_eq!(changes.rose, 0);
        assert!(!changes.take_rose(1 << 2));
    }
}
