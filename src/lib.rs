pub mod clock;
pub mod config;
pub mod errors;
pub mod report;
pub mod stats;
pub mod tester;
pub mod timing;
pub mod workloads;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::RunConfig;
pub use errors::ReptestError;
pub use stats::{TestStatistics, TestSummary};
pub use tester::{Iteration, RepetitionTester, Workload};
pub use timing::{ElapsedSlot, ScopedTimer};
