use crate::clock::Clock;
use crate::errors::ReptestError;

/// Output location for one timed region.
#[derive(Debug, Default)]
pub struct ElapsedSlot {
    value: Option<Result<u64, ReptestError>>,
}

impl ElapsedSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a duration measured by the caller instead of a `ScopedTimer`.
    pub fn set(&mut self, elapsed_ns: u64) {
        self.value = Some(Ok(elapsed_ns));
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the recorded value, leaving the slot empty.
    pub fn take(&mut self) -> Option<Result<u64, ReptestError>> {
        self.value.take()
    }

    fn fill(&mut self, value: Result<u64, ReptestError>) {
        self.value = Some(value);
    }
}

/// Guard that times the region between its construction and its drop.
///
/// The elapsed ticks are written to the slot exactly once, whether the
/// region ends by `stop`, by falling out of scope, by an early `return`,
/// or by unwinding. A clock failure at either end is written instead.
pub struct ScopedTimer<'a> {
    clock: &'a dyn Clock,
    slot: &'a mut ElapsedSlot,
    start: Option<Result<u64, ReptestError>>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(clock: &'a dyn Clock, slot: &'a mut ElapsedSlot) -> Self {
        let start = clock.now();
        Self {
            clock,
            slot,
            start: Some(start),
        }
    }

    pub fn stop(self) {}
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        if let Some(start) = self.start.take() {
            let elapsed =
                start.and_then(|start| self.clock.now().map(|end| end.saturating_sub(start)));
            self.slot.fill(elapsed);
        }
    }
}
