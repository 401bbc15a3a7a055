//! Gate modes and their per-mode constants.
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{EnumIter, IntoStaticStr};

use crate::design_parameters::TICKS_PER_SECOND;
use crate::Config;

/// The measurement mode of the frequency counter.
///
/// The discriminants are the mode codes of the external interface.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    TryFromPrimitive,
    IntoPrimitive,
    IntoStaticStr,
    EnumIter,
)]
#[repr(u8)]
pub enum GateMode {
    #[default]
    Off = 0,
    Gate1s = 1,
    Gate10ms = 2,
    Gate100ms = 3,
    Gate10s = 4,
    Gate100s = 5,
    /// Count while the external gate input is low.
    ExternalGate = 6,
    /// Measure the period of a single input cycle.
    Period1 = 7,
    /// Measure the period of 10 input cycles.
    Period10 = 8,
    /// Measure the period of 100 input cycles.
    Period100 = 9,
}

/// How a measurement window is opened and closed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Gating {
    /// Counter disarmed.
    Off,
    /// The window is a fixed number of gate ticks.
    Timed,
    /// The window is the low phase of the external gate input.
    External,
    /// The window spans `average` input cycles and is timed by the microsecond clock.
    Period { average: u8 },
}

/// Constants of a gate mode, resolved once when the mode is committed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModeConfig {
    pub gating: Gating,

    /// Gate ticks per measurement window, used to scale counts to Hz. Zero if the result is
    /// not a count.
    pub window: u16,

    /// The value the gate tick countdown is reloaded with on expiry. Zero if the gate tick
    /// has nothing to do in this mode.
    pub reload: u16,
}

impl ModeConfig {
    pub const OFF: Self = Self {
        gating: Gating::Off,
        window: 0,
        reload: 0,
    };
}

impl GateMode {
    /// Check whether the mode was compiled in.
    pub fn is_supported(&self) -> bool {
        match self {
            Self::ExternalGate => cfg!(feature = "external-gate"),
            Self::Period1 | Self::Period10 | Self::Period100 => {
                cfg!(feature = "period")
            }
            _ => true,
        }
    }

    /// Check whether the mode inverts a period measurement.
    pub fn is_period(&self) -> bool {
        matches!(self, Self::Period1 | Self::Period10 | Self::Period100)
    }

    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    /// Resolve the constants of this mode.
    pub fn config(&self, config: &Config) -> ModeConfig {
        let timed = |ticks_per_window: u32| ModeConfig {
            gating: Gating::Timed,
            window: ticks_per_window as u16,
            reload: ticks_per_window as u16,
        };
        let period = |average| ModeConfig {
            gating: Gating::Period { average },
            window: 0,
            reload: config.timeout_ticks(),
        };

        match self {
            Self::Off => ModeConfig::OFF,
            Self::Gate10ms => timed(TICKS_PER_SECOND / 100),
            Self::Gate100ms => timed(TICKS_PER_SECOND / 10),
            Self::Gate1s => timed(TICKS_PER_SECOND),
            Self::Gate10s => timed(TICKS_PER_SECOND * 10),
            Self::Gate100s => timed(TICKS_PER_SECOND * 100),
            // Windows are edge-driven, results scale like a 1 s gate.
            Self::ExternalGate => ModeConfig {
                gating: Gating::External,
                window: TICKS_PER_SECOND as u16,
                reload: 0,
            },
            Self::Period1 => period(1),
            Self::Period10 => period(10),
            Self::Period100 => period(100),
        }
    }
}
