//! Single-slot result register shared between interrupt handlers and the mainline.
//!
//! # Design
//! A completed measurement is a multi-byte value that is produced in interrupt context and
//! consumed by the mainline. To rule out torn reads, the sample and its ready flag are only
//! ever accessed together inside a critical section. There is no queue: publishing over an
//! unread sample replaces it.
use core::cell::Cell;
use critical_section::Mutex;

/// A completed measurement as published by an interrupt handler.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Sample {
    /// Nothing has been published since the mode was set.
    #[default]
    Empty,
    /// Input transitions counted during one gate window.
    Count(u32),
    /// Microseconds spanned by the averaged input cycles.
    Period(u32),
    /// The period measurement timed out.
    NoSignal,
}

impl Sample {
    /// The unscaled integer value of the sample. `Empty` and `NoSignal` read as zero.
    pub fn raw(&self) -> u32 {
        match *self {
            Self::Count(count) => count,
            Self::Period(micros) => micros,
            Self::Empty | Self::NoSignal => 0,
        }
    }
}

#[derive(Copy, Clone, Default)]
struct Register {
    sample: Sample,
    ready: bool,
}

pub struct Mailbox {
    register: Mutex<Cell<Register>>,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            register: Mutex::new(Cell::new(Register {
                sample: Sample::Empty,
                ready: false,
            })),
        }
    }

    /// Publish a completed sample and flag it ready.
    pub fn publish(&self, sample: Sample) {
        critical_section::with(|cs| {
            self.register.borrow(cs).set(Register {
                sample,
                ready: true,
            })
        });
    }

    /// Take the latest sample and clear the ready flag.
    ///
    /// The sample stays in the register and is returned again by later calls until a new one
    /// is published.
    pub fn consume(&self) -> Sample {
        critical_section::with(|cs| {
            let register = self.register.borrow(cs);
            let Register { sample, .. } = register.get();
            register.set(Register {
                sample,
                ready: false,
            });
            sample
        })
    }

    /// Check whether an unread sample is available.
    pub fn is_ready(&self) -> bool {
        critical_section::with(|cs| self.register.borrow(cs).get().ready)
    }

    /// Drop any sample and the ready flag.
    pub fn reset(&self) {
        critical_section::with(|cs| {
            self.register.borrow(cs).set(Register::default())
        });
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
