use std::cell::Cell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Instant;

use crate::errors::ReptestError;

/// Nanosecond tick source. Ticks never decrease between calls.
pub trait Clock {
    fn now(&self) -> Result<u64, ReptestError>;
}

/// Monotonic clock measured from a process-wide anchor.
///
/// Backed by `Instant`, so wall-clock adjustments never show up in the
/// tick count. Fails only when the elapsed nanoseconds no longer fit in
/// a `u64` (roughly 584 years after the anchor).
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

static ANCHOR: OnceLock<Instant> = OnceLock::new();

impl Clock for MonotonicClock {
    fn now(&self) -> Result<u64, ReptestError> {
        let anchor = ANCHOR.get_or_init(Instant::now);
        let nanos = anchor.elapsed().as_nanos();
        u64::try_from(nanos).map_err(|_| ReptestError::ClockUnavailable {
            detail: format!("tick count {} exceeds u64 range", nanos),
        })
    }
}

/// Deterministic clock for driving time-dependent logic without sleeping.
///
/// Every read returns the current tick and then advances by `step`.
/// Clones share the same tick counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Rc<Cell<u64>>,
    step: u64,
}

impl ManualClock {
    pub fn new(step: u64) -> Self {
        Self {
            ticks: Rc::new(Cell::new(0)),
            step,
        }
    }

    pub fn advance(&self, ticks: u64) {
        self.ticks.set(self.ticks.get().saturating_add(ticks));
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<u64, ReptestError> {
        let current = self.ticks.get();
        self.ticks.set(current.saturating_add(self.step));
        Ok(current)
    }
}

pub fn to_seconds(ticks: u64) -> f64 {
    ticks as f64 / 1e9
}

pub fn to_milliseconds(ticks: u64) -> f64 {
    ticks as f64 / 1e6
}

/// Same conversion as `to_milliseconds`, for means that are already fractional.
pub fn to_milliseconds_f64(ticks: f64) -> f64 {
    ticks / 1e6
}
