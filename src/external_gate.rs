//! External gate edge handling.
//!
//! The gate input is active low: a falling edge opens the window, a rising edge closes it and
//! publishes the count. A rising edge without a preceding falling edge (e.g. when the mode is
//! selected while the gate is low) publishes nothing.
use pulse_hal::{EdgeNotifier, PinChanges, PulseCounter, Timebase};

use crate::mailbox::Sample;
use crate::mode::Gating;
use crate::FrequencyCounter;

impl<C, T, E> FrequencyCounter<C, T, E>
where
    C: PulseCounter,
    T: Timebase,
    E: EdgeNotifier,
{
    /// Pin-change handler. Must be called from the pin-change interrupt of the gate input.
    ///
    /// Edges on the configured gate pins are consumed from `changes`. Other pins are left for
    /// other consumers of the same interrupt.
    pub fn on_pin_change(&self, changes: &mut PinChanges) {
        let mask = self.config.gate_mask;
        let count = critical_section::with(|cs| {
            let mut engine = self.engine.borrow_ref_mut(cs);
            if engine.active.gating != Gating::External {
                return None;
            }
            let mut count = None;
            if changes.take_fell(mask) {
                engine.counter.set_count(0);
                engine.counter.clear_overflow();
                engine.overflows = 0;
                engine.counter.start();
            }
            if changes.take_rose(mask) {
                count = engine.close_window();
            }
            count
        });

        if let Some(count) = count {
            log::trace!("External gate closed: {count}");
            self.mailbox.publish(Sample::Count(count));
        }
    }
}
