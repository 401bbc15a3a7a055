//! Counter overflow handling.
//!
//! # Design
//! The counting register is narrower than a gate window's count, so in gate modes every wrap
//! is accumulated as the high-order part of the count.
//!
//! In period modes the register is instead preloaded so that it wraps after exactly the
//! number of averaged input cycles. Each wrap is an input edge of known phase and is
//! timestamped against the microsecond clock. The time between consecutive wraps is the
//! period of the averaged cycles. The first wrap after arming only provides the reference
//! timestamp.
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
    /// Counter overflow handler. Must be called from the overflow interrupt of the
    /// counting register.
    pub fn on_overflow(&self) {
        let period = critical_section::with(|cs| {
            let mut engine = self.engine.borrow_ref_mut(cs);
            // Already folded into a closed window or discarded by a re-arm.
            if !engine.counter.take_overflow() {
                return None;
            }
            match engine.active.gating {
                Gating::Timed | Gating::External => {
                    engine.overflows = engine.overflows.wrapping_add(1);
                    None
                }
                Gating::Period { average } => {
                    let now = engine.clock.now();
                    engine.counter.set_count(C::preload(average as u32));
                    // A completed period restarts the timeout.
                    self.prescaler
                        .store(engine.active.reload, Ordering::Relaxed);
                    engine.previous.replace(now).map(|previous| {
                        now.ticks().wrapping_sub(previous.ticks())
                    })
                }
                Gating::Off => None,
            }
        });

        if let Some(micros) = period {
            log::trace!("Period: {micros} us");
            self.mailbox.publish(Sample::Period(micros));
        }
    }
}
