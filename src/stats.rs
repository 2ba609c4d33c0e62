use std::io::{self, Write};

use serde::Serialize;

use crate::report;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Samples recorded for one registered test.
///
/// The byte count is treated as the size of the workload, constant for the
/// whole test: each measurement overwrites it and `reset` keeps it.
#[derive(Debug, Clone)]
pub struct TestStatistics {
    name: String,
    measurements: Vec<u64>,
    total_bytes: u64,
}

/// Point-in-time copy of a test's statistics, used by reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSummary {
    pub name: String,
    pub test_count: usize,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    pub total_bytes: u64,
    pub throughput_gbps: f64,
}

impl TestStatistics {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            measurements: Vec::new(),
            total_bytes: 0,
        }
    }

    pub fn add_measurement(&mut self, duration_ns: u64, bytes: u64) {
        self.measurements.push(duration_ns);
        self.total_bytes = bytes;
    }

    pub fn reset(&mut self) {
        self.measurements.clear();
    }

    pub fn min(&self) -> u64 {
        self.measurements.iter().copied().min().unwrap_or(0)
    }

    pub fn max(&self) -> u64 {
        self.measurements.iter().copied().max().unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        if self.measurements.is_empty() {
            return 0.0;
        }
        let sum: u128 = self.measurements.iter().map(|&m| m as u128).sum();
        sum as f64 / self.measurements.len() as f64
    }

    /// GiB processed per second of mean iteration time.
    pub fn throughput_gbps(&self) -> f64 {
        if self.measurements.is_empty() || self.total_bytes == 0 {
            return 0.0;
        }
        let mean_seconds = self.mean() / 1e9;
        if mean_seconds <= 0.0 {
            return 0.0;
        }
        let gigabytes = self.total_bytes as f64 / BYTES_PER_GIB;
        gigabytes / mean_seconds
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn test_count(&self) -> usize {
        self.measurements.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn measurements(&self) -> &[u64] {
        &self.measurements
    }

    pub fn summary(&self) -> TestSummary {
        TestSummary {
            name: self.name.clone(),
            test_count: self.test_count(),
            min_ns: self.min(),
            max_ns: self.max(),
            mean_ns: self.mean(),
            total_bytes: self.total_bytes,
            throughput_gbps: self.throughput_gbps(),
        }
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(report::format_test_report(&self.summary()).as_bytes())
    }

    /// Prints the per-test report to stdout.
    pub fn print_report(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_report(&mut handle)
    }
}
