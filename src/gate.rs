//! Gate timer coordination.
//!
//! # Design
//! The gate tick is a fixed-rate interrupt (see [`TICK_PERIOD`]) that counts down the ticks
//! of the current window. When the countdown expires:
//!
//! * In timed gate modes, the counter is stopped, its value combined with the overflow count
//!   and the counter restarted from zero. This is the only place where input transitions can
//!   be lost, so the critical section covers just the register accesses. The very first
//!   expiry after a mode change only starts the counter.
//! * In period modes, the expiry is a timeout: no period completed since the countdown was
//!   last restarted. The counter is re-armed and the no-signal result published, unless an
//!   unread result is still pending.
//!
//! Application timers often tick faster than the gate. [`TickDivider`] derives the gate tick
//! from such a timer.
//!
//! [`TICK_PERIOD`]: crate::design_parameters::TICK_PERIOD
use core::sync::atomic::Ordering;

use pulse_hal::{EdgeNotifier, PulseCounter, Timebase};

use crate::mailbox::Sample;
use crate::mode::Gating;
use crate::FrequencyCounter;

impl<C, T, E> FrequencyCounter<C, T, E>
where
    C: PulseCounter,
    T: Timebase,
    E: EdgeNotifier,
{
    /// Gate tick handler. Must be called every [`TICK_PERIOD`] from the tick interrupt.
    ///
    /// [`TICK_PERIOD`]: crate::design_parameters::TICK_PERIOD
    pub fn on_tick(&self) {
        let expired = self
            .prescaler
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |ticks| {
                ticks.checked_sub(1)
            })
            == Ok(1);
        if !expired {
            return;
        }

        let (gating, reload, count) = critical_section::with(|cs| {
            let mut engine = self.engine.borrow_ref_mut(cs);
            let active = engine.active;
            let count = match active.gating {
                Gating::Timed => {
                    let count = engine.close_window();
                    engine.counter.set_count(0);
                    engine.counter.start();
                    count
                }
                Gating::Period { average } => {
                    if !self.mailbox.is_ready() {
                        engine.counter.set_count(C::preload(average as u32));
                        engine.counter.clear_overflow();
                        engine.previous = None;
                        self.mailbox.publish(Sample::NoSignal);
                    }
                    None
                }
                Gating::Off | Gating::External => None,
            };
            (active.gating, active.reload, count)
        });
        self.prescaler.store(reload, Ordering::Relaxed);

        match (gating, count) {
            (Gating::Timed, Some(count)) => {
                log::trace!("Gate closed: {count}");
                self.mailbox.publish(Sample::Count(count));
            }
            (Gating::Period { .. }, _) => log::trace!("Period timeout"),
            _ => {}
        }
    }
}

/// Divide a fast periodic tick down to the gate tick.
///
/// # Example
/// With a 1 ms system timer, `TickDivider::new(10)` yields a gate tick every 10th call.
#[derive(Copy, Clone, Debug)]
pub struct TickDivider {
    ratio: u8,
    remaining: u8,
}

impl TickDivider {
    pub const fn new(ratio: u8) -> Self {
        assert!(ratio > 0);
        Self {
            ratio,
            remaining: ratio,
        }
    }

    /// Advance by one fast tick.
    ///
    /// # Returns
    /// True if a gate tick is due.
    pub fn tick(&mut self) -> bool {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.ratio;
            true
        } else {
            false
        }
    }
}
