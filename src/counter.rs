//! The frequency counter and its mode controller.
//!
//! # Design
//! The counter is driven from up to four execution contexts:
//! * The mainline selects the mode and reads results.
//! * The gate tick interrupt closes timed gate windows and times out period measurements
//!   (see [`FrequencyCounter::on_tick`]).
//! * The counter overflow interrupt extends the hardware count or timestamps input cycles
//!   (see [`FrequencyCounter::on_overflow`]).
//! * The pin-change interrupt opens and closes external gate windows
//!   (see [`FrequencyCounter::on_pin_change`]).
//!
//! All methods take `&self` so that a single counter can be shared between these contexts,
//! typically from a `static`. The peripherals and the accumulation state are kept behind a
//! critical-section mutex. Completed samples are handed to the mainline through the
//! [`Mailbox`]. The gate tick countdown is only ever decremented by the tick interrupt and is
//! kept in an atomic.
//!
//! The counter owns its [`PulseCounter`] peripheral. As HAL peripherals are singletons, at
//! most one frequency counter can exist for a given counting register.
use core::cell::RefCell;
use core::fmt::Write;
use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

use critical_section::Mutex;
use embassy_futures::yield_now;
use pulse_hal::{EdgeNotifier, Instant, PulseCounter, Timebase};

use crate::design_parameters::READING_CAPACITY;
use crate::mailbox::{Mailbox, Sample};
use crate::mode::{GateMode, Gating, ModeConfig};
use crate::reading::Reading;
use crate::{Config, Error};

/// Output buffer of [`FrequencyCounter::read_formatted`].
pub type ReadingString = heapless::String<READING_CAPACITY>;

/// Peripherals and interrupt-side accumulation state.
pub(crate) struct Engine<C, T, E> {
    pub counter: C,
    pub clock: T,
    pub edges: E,

    /// Constants of the committed mode.
    pub active: ModeConfig,

    /// Counter wraps in the current window. These are the high-order bits of the count.
    pub overflows: u32,

    /// Timestamp of the previous completed period measurement.
    pub previous: Option<Instant>,
}

impl<C: PulseCounter, T, E: EdgeNotifier> Engine<C, T, E> {
    /// Stop counting and release every interrupt source of the active mode.
    fn disarm(&mut self) {
        self.counter.unlisten();
        self.counter.stop();
        self.counter.clear_overflow();
        if self.active.gating == Gating::External {
            self.edges.unsubscribe();
        }
        self.active = ModeConfig::OFF;
        self.overflows = 0;
        self.previous = None;
    }

    /// Configure the peripherals for `active`.
    fn arm(&mut self, active: ModeConfig, gate_mask: u8) {
        self.active = active;
        match active.gating {
            Gating::Off => {}
            // Counting is started by the first gate tick (or the first falling gate edge)
            // so that a partial window is never published.
            Gating::Timed => {
                self.counter.set_count(0);
                self.counter.listen();
            }
            Gating::External => {
                self.counter.set_count(0);
                self.counter.listen();
                self.edges.subscribe(gate_mask);
            }
            Gating::Period { average } => {
                self.counter.set_count(C::preload(average as u32));
                self.counter.listen();
                self.counter.start();
            }
        }
    }

    /// Stop the counter and assemble the full count of the window.
    ///
    /// A wrap whose overflow interrupt has not been serviced yet is folded into the count
    /// and acknowledged here, so that it is neither lost nor counted in the next window.
    ///
    /// # Returns
    /// The count, if the counter was running, i.e. a complete window was observed.
    pub fn close_window(&mut self) -> Option<u32> {
        let running = self.counter.is_running();
        self.counter.stop();
        if self.counter.take_overflow() {
            self.overflows = self.overflows.wrapping_add(1);
        }
        let low = self.counter.count();
        let count = (self.overflows << C::BITS) | low;
        self.overflows = 0;
        running.then_some(count)
    }
}

/// The gated frequency counter.
pub struct FrequencyCounter<C, T, E> {
    pub(crate) config: Config,
    mode: AtomicU8,
    generation: AtomicU32,
    /// Gate ticks remaining in the current window. Zero if the gate tick is idle.
    pub(crate) prescaler: AtomicU16,
    pub(crate) engine: Mutex<RefCell<Engine<C, T, E>>>,
    pub(crate) mailbox: Mailbox,
}

impl<C, T, E> FrequencyCounter<C, T, E>
where
    C: PulseCounter,
    T: Timebase,
    E: EdgeNotifier,
{
    /// Construct the frequency counter. The counter starts in [`GateMode::Off`].
    ///
    /// # Args
    /// * `counter` - The counting register clocked by the input signal.
    /// * `clock` - Microsecond clock used for period measurements.
    /// * `edges` - Pin-change subscription for the external gate input.
    /// * `config` - Board configuration.
    pub fn new(
        mut counter: C,
        clock: T,
        edges: E,
        config: Config,
    ) -> Result<Self, Error> {
        config.validate()?;
        counter.unlisten();
        counter.stop();
        counter.clear_overflow();

        Ok(Self {
            config,
            mode: AtomicU8::new(GateMode::Off as u8),
            generation: AtomicU32::new(0),
            prescaler: AtomicU16::new(0),
            engine: Mutex::new(RefCell::new(Engine {
                counter,
                clock,
                edges,
                active: ModeConfig::OFF,
                overflows: 0,
                previous: None,
            })),
            mailbox: Mailbox::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the current gate mode.
    pub fn get_mode(&self) -> GateMode {
        GateMode::try_from(self.mode.load(Ordering::Acquire))
            .unwrap_or_default()
    }

    /// Select a gate mode and restart measuring.
    ///
    /// Any pending or in-flight result is discarded and pending blocking reads are released.
    ///
    /// # Args
    /// * `code` - The mode code, see [`GateMode`].
    ///
    /// # Returns
    /// The committed mode. Unknown codes and modes that are not compiled in are rejected
    /// without changing state.
    pub fn set_mode(&self, code: u8) -> Result<GateMode, Error> {
        let mode = GateMode::try_from(code)
            .ok()
            .filter(GateMode::is_supported)
            .ok_or_else(|| {
                log::warn!("Rejected gate mode {code}");
                Error::InvalidMode(code)
            })?;
        let active = mode.config(&self.config);

        critical_section::with(|cs| {
            let mut engine = self.engine.borrow_ref_mut(cs);
            engine.disarm();
            self.mailbox.reset();
            engine.arm(active, self.config.gate_mask);

            let prescaler = match active.gating {
                Gating::Timed => 1,
                Gating::Period { .. } => active.reload,
                Gating::Off | Gating::External => 0,
            };
            self.prescaler.store(prescaler, Ordering::Relaxed);
            self.mode.store(mode.into(), Ordering::Release);
            self.generation.fetch_add(1, Ordering::AcqRel);
        });

        log::info!("Gate mode {} ({:?})", mode.name(), active);
        Ok(mode)
    }

    /// Check whether a result has been published since the last read.
    pub fn is_ready(&self) -> bool {
        self.mailbox.is_ready()
    }

    /// Read the latest raw result.
    ///
    /// The value is not scaled for the gate window, the period averaging or the configured
    /// post scale: counts are input transitions per window, periods are microseconds per
    /// averaged cycles. A timed-out period measurement reads as zero.
    ///
    /// # Args
    /// * `wait` - Wait for a fresh result. The wait ends early if the mode is or becomes
    ///   [`GateMode::Off`] or is changed.
    pub async fn read_raw(&self, wait: bool) -> u32 {
        self.read_sample(wait).await.raw()
    }

    /// Read the latest result scaled to Hz.
    ///
    /// # Args
    /// * `wait` - Wait for a fresh result, see [`Self::read_raw`].
    pub async fn read(&self, wait: bool) -> Reading {
        let sample = self.read_sample(wait).await;
        Reading::new(sample, &self.active(), self.config.post_scale)
    }

    /// Read the latest result and render it into `buffer` as a decimal frequency in Hz.
    ///
    /// Gate windows of at least one second carry one fractional digit per decade, period
    /// modes always carry five. A timed-out period measurement renders as `0.00000`, a period
    /// too short to invert as `999999`.
    ///
    /// # Args
    /// * `buffer` - Destination of the rendered reading.
    /// * `wait` - Wait for a fresh result, see [`Self::read_raw`].
    ///
    /// # Returns
    /// The rendered reading. Without a buffer nothing is read.
    pub async fn read_formatted<'a>(
        &self,
        buffer: Option<&'a mut ReadingString>,
        wait: bool,
    ) -> Result<&'a str, Error> {
        let buffer = buffer.ok_or(Error::NoOutputBuffer)?;
        let reading = self.read(wait).await;
        buffer.clear();
        write!(buffer, "{reading}").map_err(|_| Error::BufferTooSmall)?;
        Ok(buffer.as_str())
    }

    async fn read_sample(&self, wait: bool) -> Sample {
        if wait {
            let generation = self.generation.load(Ordering::Acquire);
            while self.get_mode() != GateMode::Off
                && !self.mailbox.is_ready()
                && self.generation.load(Ordering::Acquire) == generation
            {
                yield_now().await;
            }
        }
        self.mailbox.consume()
    }

    fn active(&self) -> ModeConfig {
        critical_section::with(|cs| self.engine.borrow_ref(cs).active)
    }
}
