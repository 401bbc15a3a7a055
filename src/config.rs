//! Frequency counter configuration
//!
//! # Design
//! The counter is configured once, when it is constructed. The configuration covers the parts
//! of the measurement that depend on the board rather than on the selected gate mode: how
//! long a period measurement may take before the input is considered dead, an integer
//! multiplier compensating for an external prescaler in front of the counter input, and the
//! pin carrying the external gate signal.
//!
//! Which gate modes exist at all is selected at build time through the `external-gate` and
//! `period` Cargo features.
use serde::{Deserialize, Serialize};

use crate::design_parameters::{GATE_INPUT_MASK, PERIOD_TIMEOUT, TICK_PERIOD};
use crate::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Milliseconds without a completed period measurement before the no-signal reading is
    /// published. Must be a nonzero multiple of the gate tick period.
    pub period_timeout_ms: u32,

    /// Factor applied to every formatted reading, e.g. the ratio of an external frequency
    /// divider ahead of the counter input. Raw reads are never multiplied.
    pub post_scale: u32,

    /// Pin-change mask of the external gate input.
    pub gate_mask: u8,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            period_timeout_ms: PERIOD_TIMEOUT.ticks(),
            post_scale: 1,
            gate_mask: GATE_INPUT_MASK,
        }
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<(), Error> {
        let tick = TICK_PERIOD.ticks();
        if self.period_timeout_ms == 0 || self.period_timeout_ms % tick != 0 {
            return Err(Error::InvalidConfig(
                "period timeout must be a nonzero multiple of the tick period",
            ));
        }
        if self.period_timeout_ms / tick > u16::MAX as u32 {
            return Err(Error::InvalidConfig("period timeout too long"));
        }
        if self.post_scale == 0 {
            return Err(Error::InvalidConfig("post scale must be nonzero"));
        }
        if self.gate_mask == 0 {
            return Err(Error::InvalidConfig("gate mask must select a pin"));
        }
        Ok(())
    }

    /// The period timeout in gate ticks.
    pub fn timeout_ticks(&self) -> u16 {
        (self.period_timeout_ms / TICK_PERIOD.ticks()) as u16
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.timeout_ticks(), 500);
        assert_eq!(config.post_scale, 1);
    }

    #[test]
    fn invalid() {
        let config = Config {
            period_timeout_ms: 5005,
            ..Config::new()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config {
            period_timeout_ms: 0,
            ..Config::new()
        };
        assert!(config.validate().is_err());

        let config = Config {
            period_timeout_ms: 10 * (u16::MAX as u32 + 1),
            ..Config::new()
        };
        assert!(config.validate().is_err());

        let config = Config {
            post_scale: 0,
            ..Config::new()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserialize_partial() {
        let (config, _): (Config, _) =
            serde_json_core::from_str(r#"{"post_scale":8}"#).unwrap();
        assert_eq!(config.post_scale, 8);
        assert_eq!(config.period_timeout_ms, 5000);
        assert_eq!(config.gate_mask, GATE_INPUT_MASK);

        let (config, _): (Config, _) = serde_json_core::from_str(
            r#"{"period_timeout_ms":2000,"gate_mask":4}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_ticks(), 200);
        assert_eq!(config.gate_mask, 4);
    }
}
