#![cfg_attr(not(test), no_std)]
//! Gated pulse counter and reciprocal frequency meter.
//!
//! A [`FrequencyCounter`] measures the frequency of an input signal with a hardware counting
//! register, a periodic gate tick and a microsecond clock. The application forwards three
//! interrupts to it ([`FrequencyCounter::on_tick`], [`FrequencyCounter::on_overflow`] and
//! [`FrequencyCounter::on_pin_change`]) and reads results from the mainline with
//! [`FrequencyCounter::read_raw`] or [`FrequencyCounter::read_formatted`].
//!
//! Results are computed with integer arithmetic only and truncated, never rounded.

mod capture;
pub mod config;
mod counter;
pub mod design_parameters;
mod external_gate;
mod gate;
pub mod mailbox;
pub mod mode;
pub mod reading;

pub use config::Config;
pub use counter::{FrequencyCounter, ReadingString};
pub use gate::TickDivider;
pub use mailbox::{Mailbox, Sample};
pub use mode::{GateMode, Gating, ModeConfig};
pub use pulse_hal::{EdgeNotifier, Instant, PinChanges, PulseCounter, Timebase};
pub use reading::{FixedPoint, Reading};

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid gate mode {0}")]
    InvalidMode(u8),
    #[error("No output buffer")]
    NoOutputBuffer,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("Reading does not fit the output buffer")]
    BufferTooSmall,
}
