use std::io::{self, Write};

use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock, to_seconds};
use crate::config::RunConfig;
use crate::errors::ReptestError;
use crate::report;
use crate::stats::{TestStatistics, TestSummary};
use crate::timing::{ElapsedSlot, ScopedTimer};

/// One unit of benchmarked work.
///
/// Each call runs a single iteration. The workload reports how many bytes
/// it processed and may time its own inner region through `Iteration`;
/// otherwise the whole call is timed. Returning `false` stops the test
/// after this iteration.
///
/// The driver never interrupts a call: a workload that does not return
/// hangs the run.
pub trait Workload {
    fn run(&mut self, iteration: &mut Iteration<'_>) -> bool;
}

impl<F> Workload for F
where
    F: FnMut(&mut Iteration<'_>) -> bool,
{
    fn run(&mut self, iteration: &mut Iteration<'_>) -> bool {
        self(iteration)
    }
}

/// Per-call context handed to a workload.
pub struct Iteration<'a> {
    clock: &'a dyn Clock,
    index: u64,
    elapsed: ElapsedSlot,
    bytes: u64,
}

impl<'a> Iteration<'a> {
    fn new(clock: &'a dyn Clock, index: u64) -> Self {
        Self {
            clock,
            index,
            elapsed: ElapsedSlot::new(),
            bytes: 0,
        }
    }

    /// Zero-based iteration number within the current run of the test.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn set_bytes(&mut self, bytes: u64) {
        self.bytes = bytes;
    }

    /// Report a duration the workload measured itself.
    pub fn set_elapsed(&mut self, elapsed_ns: u64) {
        self.elapsed.set(elapsed_ns);
    }

    /// Start a timing region covering only part of the call.
    pub fn timer(&mut self) -> ScopedTimer<'_> {
        ScopedTimer::new(self.clock, &mut self.elapsed)
    }

    /// Time `f` as this iteration's measured region.
    pub fn time<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let _timer = ScopedTimer::new(self.clock, &mut self.elapsed);
        f()
    }
}

struct RegisteredTest {
    workload: Box<dyn Workload>,
    stats: TestStatistics,
}

/// Runs registered workloads repeatedly and reports their statistics.
pub struct RepetitionTester {
    tests: Vec<RegisteredTest>,
    clock: Box<dyn Clock>,
}

impl Default for RepetitionTester {
    fn default() -> Self {
        Self::new()
    }
}

impl RepetitionTester {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            tests: Vec::new(),
            clock: Box::new(clock),
        }
    }

    pub fn register_test(&mut self, name: &str, workload: impl Workload + 'static) {
        self.register_boxed(name, Box::new(workload));
    }

    /// Registers a workload chosen at runtime.
    pub fn register_boxed(&mut self, name: &str, workload: Box<dyn Workload>) {
        self.tests.push(RegisteredTest {
            workload,
            stats: TestStatistics::new(name),
        });
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Statistics of every test, in registration order.
    pub fn tests(&self) -> impl Iterator<Item = &TestStatistics> {
        self.tests.iter().map(|t| &t.stats)
    }

    /// First registered test with the given name.
    pub fn statistics(&self, name: &str) -> Option<&TestStatistics> {
        self.tests().find(|s| s.name() == name)
    }

    pub fn summaries(&self) -> Vec<TestSummary> {
        self.tests().map(TestStatistics::summary).collect()
    }

    /// Runs every test and prints the reports to stdout, colored when the
    /// terminal supports it.
    pub fn run_all_tests(&mut self, config: &RunConfig) -> Result<(), ReptestError> {
        let color = report::stdout_supports_color();
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.run_reports(config, &mut handle, color)
    }

    /// Runs every test in registration order, writing each test's report
    /// and then the comparison to `out` as plain text.
    pub fn run_all_tests_to<W: Write>(
        &mut self,
        config: &RunConfig,
        out: &mut W,
    ) -> Result<(), ReptestError> {
        self.run_reports(config, out, false)
    }

    fn run_reports<W: Write>(
        &mut self,
        config: &RunConfig,
        out: &mut W,
        color: bool,
    ) -> Result<(), ReptestError> {
        out.write_all(
            report::format_run_banner(self.tests.len(), config.duration_budget_seconds).as_bytes(),
        )?;

        for index in 0..self.tests.len() {
            self.run_single_test(index, config, out)?;
            self.tests[index].stats.write_report(out)?;
            out.write_all(b"\n")?;
        }

        out.write_all(report::format_comparison(&self.summaries(), color).as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Runs the test at `index` until its budget and iteration floor are
    /// both met or the workload asks to stop.
    ///
    /// The iteration floor wins over the time budget: with a zero budget
    /// the test still runs `min_iterations` times. An index past the last
    /// registered test does nothing.
    pub fn run_single_test<W: Write>(
        &mut self,
        index: usize,
        config: &RunConfig,
        out: &mut W,
    ) -> Result<(), ReptestError> {
        let clock: &dyn Clock = self.clock.as_ref();
        let Some(test) = self.tests.get_mut(index) else {
            return Ok(());
        };

        if config.show_progress {
            writeln!(out, "Running {}...", test.stats.name())?;
            out.flush()?;
        }
        debug!(test = test.stats.name(), "starting test");

        test.stats.reset();
        let test_start = clock.now()?;
        let budget_ns = config.duration_budget_ticks();
        let mut iterations: u64 = 0;

        let elapsed = loop {
            let elapsed = clock.now()?.saturating_sub(test_start);
            if elapsed >= budget_ns && iterations >= config.min_iterations {
                break elapsed;
            }

            let mut iteration = Iteration::new(clock, iterations);
            let mut outer = ElapsedSlot::new();
            let keep_going = {
                let _timer = ScopedTimer::new(clock, &mut outer);
                test.workload.run(&mut iteration)
            };

            let duration_ns = match iteration.elapsed.take().or_else(|| outer.take()) {
                Some(result) => result?,
                None => 0,
            };
            trace!(
                test = test.stats.name(),
                iteration = iterations,
                duration_ns,
                bytes = iteration.bytes,
                "sample"
            );
            test.stats.add_measurement(duration_ns, iteration.bytes);
            iterations += 1;

            if !keep_going {
                debug!(test = test.stats.name(), iterations, "workload requested stop");
                break clock.now()?.saturating_sub(test_start);
            }
        };

        debug!(
            test = test.stats.name(),
            iterations,
            elapsed_s = to_seconds(elapsed),
            "finished test"
        );
        if config.show_progress {
            writeln!(
                out,
                "done: {} iterations in {:.3} s",
                iterations,
                to_seconds(elapsed)
            )?;
        }
        Ok(())
    }
}
