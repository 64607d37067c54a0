//! Fixed-period invocation of the sampling step.
//!
//! Time comes from a [`Clock`] so that tests can drive the schedule without
//! real time passing.

use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;

    /// Blocks until `deadline`. Returns immediately if it has already passed.
    fn sleep_until(&self, deadline: Instant);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}

/// What `dt` the step receives each period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TimingMode {
    /// Always the configured period.
    #[default]
    Nominal,
    /// Time since the previous tick, clamped to half and twice the period.
    Measured,
}

/// Shared flag that ends [`PeriodicDriver::run`] before its next tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct PeriodicDriver<C> {
    clock: C,
    period: Duration,
    timing: TimingMode,
    stop: StopHandle,
}

impl<C: Clock> PeriodicDriver<C> {
    pub fn new(clock: C, period: Duration, timing: TimingMode) -> Self {
        Self {
            clock,
            period,
            timing,
            stop: StopHandle::new(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Calls `step(dt)` once per period until stopped. Returns the number of
    /// ticks run.
    ///
    /// Deadlines advance by whole periods from the first tick. A step that
    /// overruns its deadline re-anchors the schedule at the time it finished,
    /// so late ticks are not replayed in a burst.
    pub fn run<F>(&self, mut step: F) -> u64
    where
        F: FnMut(f32),
    {
        let nominal = self.period.as_secs_f32();
        let mut next = self.clock.now();
        let mut previous: Option<Instant> = None;
        let mut ticks = 0u64;

        debug!(
            "Periodic driver started: period={:?}, timing={:?}",
            self.period, self.timing
        );
        while !self.stop.is_stopped() {
            let now = self.clock.now();
            let dt = match (self.timing, previous) {
                (TimingMode::Measured, Some(previous)) => now
                    .saturating_duration_since(previous)
                    .as_secs_f32()
                    .clamp(0.5 * nominal, 2.0 * nominal),
                _ => nominal,
            };
            previous = Some(now);

            step(dt);
            ticks += 1;

            next += self.period;
            let finished = self.clock.now();
            if finished > next {
                warn!(
                    "Tick {} overran its period by {:?}",
                    ticks,
                    finished - next
                );
                next = finished;
            }
            self.clock.sleep_until(next);
        }
        debug!("Periodic driver stopped after {} ticks", ticks);
        ticks
    }
}
