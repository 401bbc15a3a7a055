//! Fixed-point scaling of raw samples.
//!
//! # Design
//! A raw sample is either a count over a gate window or the duration of a number of input
//! cycles. Both are converted to a frequency in Hz represented as an integer with an implied
//! decimal point, without floating point and truncating rather than rounding:
//!
//! * Counts over gate windows shorter than a second are multiplied up to Hz. Windows longer
//!   than a second expose the extra resolution as fractional digits (one digit per decade).
//! * Periods are inverted as `10^6 * cycles / micros` with a fixed five fractional digits.
use core::fmt;

use crate::design_parameters::{
    MIN_PERIOD_MICROS, PERIOD_DECIMALS, TICKS_PER_SECOND,
};
use crate::mailbox::Sample;
use crate::mode::{Gating, ModeConfig};

/// An unsigned decimal with `decimals` implied fractional digits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedPoint {
    pub value: u64,
    pub decimals: u8,
}

impl FixedPoint {
    pub fn new(value: u64, decimals: u8) -> Self {
        Self { value, decimals }
    }

    /// The integer part.
    pub fn integer(&self) -> u64 {
        self.value / self.scale()
    }

    /// The fractional part in units of the last digit.
    pub fn fraction(&self) -> u64 {
        self.value % self.scale()
    }

    fn scale(&self) -> u64 {
        10u64.pow(self.decimals as u32)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.integer())?;
        if self.decimals != 0 {
            write!(
                f,
                ".{:0width$}",
                self.fraction(),
                width = self.decimals as usize
            )?;
        }
        Ok(())
    }
}

/// A scaled measurement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reading {
    /// Frequency in Hz.
    Frequency(FixedPoint),
    /// No period completed within the timeout. Renders as `0.00000`.
    NoSignal,
    /// The period was too short to invert. Renders as `999999`.
    Overrange,
}

impl Reading {
    /// Scale a raw sample according to the mode it was measured in.
    ///
    /// # Args
    /// * `sample` - The sample taken from the result register.
    /// * `mode` - Constants of the mode the sample was measured in.
    /// * `post_scale` - Multiplier for an external prescaler ahead of the counter input.
    ///   Results beyond `u64` saturate.
    pub fn new(sample: Sample, mode: &ModeConfig, post_scale: u32) -> Self {
        match mode.gating {
            Gating::Period { average } => match sample {
                Sample::Period(micros) => {
                    Self::from_period(micros, average, post_scale)
                }
                _ => Self::NoSignal,
            },
            _ => Self::Frequency(Self::from_count(
                sample.raw(),
                mode.window,
                post_scale,
            )),
        }
    }

    fn from_count(count: u32, window: u16, post_scale: u32) -> FixedPoint {
        let value = count as u64 * post_scale as u64;
        let window = window as u32;
        if window == 0 {
            FixedPoint::new(value, 0)
        } else if window <= TICKS_PER_SECOND {
            let gain = (TICKS_PER_SECOND / window) as u64;
            FixedPoint::new(value.saturating_mul(gain), 0)
        } else {
            FixedPoint::new(value, (window / TICKS_PER_SECOND).ilog10() as u8)
        }
    }

    fn from_period(micros: u32, average: u8, post_scale: u32) -> Self {
        let cycles = average as u64;
        if micros as u64 <= MIN_PERIOD_MICROS as u64 * cycles {
            return Self::Overrange;
        }
        let hz = 1_000_000 * 10u64.pow(PERIOD_DECIMALS as u32) * cycles
            / micros as u64;
        Self::Frequency(FixedPoint::new(
            hz.saturating_mul(post_scale as u64),
            PERIOD_DECIMALS,
        ))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frequency(hz) => fmt::Display::fmt(hz, f),
            Self::NoSignal => {
                fmt::Display::fmt(&FixedPoint::new(0, PERIOD_DECIMALS), f)
            }
            Self::Overrange => f.write_str("999999"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design_parameters::READING_CAPACITY;
    use crate::{Config, GateMode};

    fn reading(mode: GateMode, sample: Sample) -> Reading {
        Reading::new(sample, &mode.config(&Config::new()), 1)
    }

    fn render(mode: GateMode, sample: Sample) -> String {
        reading(mode, sample).to_string()
    }

    #[test]
    fn fixed_point() {
        assert_eq!(FixedPoint::new(500, 1).to_string(), "50.0");
        assert_eq!(FixedPoint::new(12345, 2).to_string(), "123.45");
        assert_eq!(FixedPoint::new(5, 3).to_string(), "0.005");
        assert_eq!(FixedPoint::new(0, 0).to_string(), "0");
        assert_eq!(
            FixedPoint::new(u64::MAX, 0).to_string(),
            "18446744073709551615"
        );
    }

    #[test]
    fn gate_scaling() {
        let count = Sample::Count(500);
        assert_eq!(render(GateMode::Gate10ms, count), "50000");
        assert_eq!(render(GateMode::Gate100ms, count), "5000");
        assert_eq!(render(GateMode::Gate1s, count), "500");
        assert_eq!(render(GateMode::Gate10s, count), "50.0");
        assert_eq!(render(GateMode::Gate100s, count), "5.00");
        assert_eq!(render(GateMode::ExternalGate, count), "500");
        assert_eq!(render(GateMode::Off, Sample::Empty), "0");
    }

    #[test]
    fn gate_truncates() {
        let count = Sample::Count(123_456_789);
        assert_eq!(
            reading(GateMode::Gate100s, count),
            Reading::Frequency(FixedPoint::new(123_456_789, 2))
        );
        assert_eq!(render(GateMode::Gate100s, count), "1234567.89");
        assert_eq!(
            render(GateMode::Gate10ms, Sample::Count(u32::MAX)),
            "429496729500"
        );
    }

    #[test]
    fn period_inversion() {
        let mode = GateMode::Period1;
        assert_eq!(render(mode, Sample::Period(1000)), "1000.00000");
        assert_eq!(render(mode, Sample::Period(3)), "999999");
        assert_eq!(render(mode, Sample::Period(24)), "999999");
        assert_eq!(render(mode, Sample::Period(25)), "40000.00000");
        assert_eq!(render(mode, Sample::Period(3_000_000)), "0.33333");
        assert_eq!(render(mode, Sample::NoSignal), "0.00000");
        assert_eq!(render(mode, Sample::Empty), "0.00000");

        let mode = GateMode::Period10;
        assert_eq!(render(mode, Sample::Period(10_000)), "1000.00000");
        assert_eq!(render(mode, Sample::Period(240)), "999999");

        let mode = GateMode::Period100;
        assert_eq!(render(mode, Sample::Period(3_000_000)), "33.33333");
    }

    #[test]
    fn post_scale() {
        let config = Config::new();
        let gate = GateMode::Gate10s.config(&config);
        let scaled = Reading::new(Sample::Count(500), &gate, 8);
        assert_eq!(scaled.to_string(), "400.0");

        let period = GateMode::Period1.config(&config);
        let scaled = Reading::new(Sample::Period(1000), &period, 2);
        assert_eq!(scaled.to_string(), "2000.00000");
        assert_eq!(
            Reading::new(Sample::Period(10), &period, 2),
            Reading::Overrange
        );
        assert_eq!(
            Reading::new(Sample::NoSignal, &period, 2),
            Reading::NoSignal
        );
    }

    #[test]
    fn post_scale_saturates() {
        let config = Config::new();
        let gate = GateMode::Gate10ms.config(&config);
        let scaled = Reading::new(Sample::Count(u32::MAX), &gate, u32::MAX);
        assert_eq!(scaled, Reading::Frequency(FixedPoint::new(u64::MAX, 0)));
        let rendered = scaled.to_string();
        assert!(rendered.len() <= READING_CAPACITY);

        let period = GateMode::Period1.config(&config);
        let scaled = Reading::new(Sample::Period(25), &period, u32::MAX);
        assert_eq!(scaled.to_string(), "171798691800000.00000");
    }
}
