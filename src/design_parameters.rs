use fugit::MillisDurationU32;

/// The interval at which the gate coordinator must be invoked. The accuracy of every
/// tick-gated measurement is directly proportional to the accuracy of this interval.
pub const TICK_PERIOD: MillisDurationU32 = MillisDurationU32::from_ticks(10);

/// Gate ticks per second.
pub const TICKS_PER_SECOND: u32 = 1000 / TICK_PERIOD.ticks();

/// The default time within which a period measurement must complete before the input is
/// reported as having no signal.
pub const PERIOD_TIMEOUT: MillisDurationU32 =
    MillisDurationU32::from_ticks(5000);

/// The external gate input. Bit 5 of the pin-change port.
pub const GATE_INPUT_MASK: u8 = 1 << 5;

/// Periods of at most this many microseconds per averaged cycle are reported as overrange.
/// This caps period readings at 10^11 / 25 units of 10^-5 Hz, i.e. 40 kHz. Faster inputs
/// are measured with the gate modes.
pub const MIN_PERIOD_MICROS: u32 = 24;

/// Fractional digits of a frequency computed from a period measurement.
pub const PERIOD_DECIMALS: u8 = 5;

/// Capacity of a formatted reading: 20 integer digits of a `u64`, the decimal point and
/// slack for the fractional digits.
pub const READING_CAPACITY: usize = 24;
