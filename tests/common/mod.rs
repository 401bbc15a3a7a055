#![allow(dead_code)]

use gatecount::{Config, FrequencyCounter, PinChanges};
use pulse_hal::sim::{
    ClockState, CounterState, EdgeState, SimClock, SimCounter, SimEdges,
};

/// Width of the simulated counting register. Narrow enough that every test window wraps it.
pub const COUNTER_BITS: u32 = 8;

/// Nanoseconds between gate ticks.
pub const TICK_NS: u64 = 10_000_000;

pub type BenchCounter = FrequencyCounter<
    SimCounter<'static, COUNTER_BITS>,
    SimClock<'static>,
    SimEdges<'static>,
>;

/// A frequency counter wired to simulated peripherals.
pub struct Bench {
    pub fc: BenchCounter,
    pub counter: &'static CounterState,
    pub clock: &'static ClockState,
    pub edges: &'static EdgeState,
}

impl Bench {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let counter = Box::leak(Box::new(CounterState::new(COUNTER_BITS)));
        let clock = Box::leak(Box::new(ClockState::new()));
        let edges = Box::leak(Box::new(EdgeState::new()));
        let fc = FrequencyCounter::new(
            SimCounter::new(counter),
            SimClock::new(clock),
            SimEdges::new(edges),
            config,
        )
        .unwrap();
        Self {
            fc,
            counter,
            clock,
            edges,
        }
    }

    /// Apply one input transition and run the overflow interrupt if it wrapped the counter.
    pub fn pulse(&self) {
        if self.counter.pulse() {
            self.fc.on_overflow();
        }
    }

    /// Deliver a pin change on the gate input.
    ///
    /// # Arguments
    ///
    /// * `low` - True if the gate input went low, false if it went high.
    pub fn gate(&self, low: bool) {
        let mask = self.fc.config().gate_mask;
        let mut changes = if low {
            PinChanges::new(mask, 0)
        } else {
            PinChanges::new(0, mask)
        };
        self.fc.on_pin_change(&mut changes);
        assert_eq!(changes, PinChanges::default());
    }
}

/// A square wave of constant frequency feeding the counter input, interleaved with the gate
/// tick in time order.
pub struct Signal {
    hz: u64,
    origin: u64,
    edges: u64,
    now: u64,
    next_tick: u64,
}

impl Signal {
    /// # Arguments
    ///
    /// * `hz` - Input frequency. Zero for a dead input.
    pub fn new(hz: u64) -> Self {
        Self {
            hz,
            origin: 0,
            edges: 0,
            now: 0,
            next_tick: TICK_NS,
        }
    }

    /// Change the input frequency. The next edge follows one full new period from now.
    pub fn set_frequency(&mut self, hz: u64) {
        self.hz = hz;
        self.origin = self.now;
        self.edges = 0;
    }

    /// Current simulation time in nanoseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    fn next_edge(&self) -> Option<u64> {
        (self.hz != 0)
            .then(|| self.origin + (self.edges + 1) * 1_000_000_000 / self.hz)
    }

    fn advance_to(&mut self, bench: &Bench, ns: u64) {
        self.now = ns;
        bench.clock.set((ns / 1000) as u32);
    }

    /// Run the simulation for `ns` nanoseconds. Input edges coinciding with a tick are
    /// delivered first.
    pub fn run(&mut self, bench: &Bench, ns: u64) {
        let end = self.now + ns;
        loop {
            let edge = self.next_edge().filter(|&t| t <= end);
            let tick = Some(self.next_tick).filter(|&t| t <= end);
            match (edge, tick) {
                (Some(e), t) if t.map_or(true, |t| e <= t) => {
                    self.advance_to(bench, e);
                    self.edges += 1;
                    bench.pulse();
                }
                (_, Some(t)) => {
                    self.advance_to(bench, t);
                    self.next_tick += TICK_NS;
                    bench.fc.on_tick();
                }
                _ => break,
            }
        }
        self.advance_to(bench, end);
    }

    /// Run the simulation for `n` gate ticks.
    pub fn ticks(&mut self, bench: &Bench, n: u64) {
        self.run(bench, n * TICK_NS);
    }
}
