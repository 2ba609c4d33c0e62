//! Built-in buffer workloads used by the `reptest` binary.

use std::hint::black_box;
use std::path::PathBuf;

use tracing::warn;

use crate::errors::ReptestError;
use crate::tester::{Iteration, Workload};

pub const WORKLOAD_NAMES: &[&str] = &["fill", "copy", "sum", "read-file"];

/// Writes a byte pattern over the whole buffer.
pub struct FillBuffer {
    buffer: Vec<u8>,
}

impl FillBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0; size],
        }
    }
}

impl Workload for FillBuffer {
    fn run(&mut self, iteration: &mut Iteration<'_>) -> bool {
        let pattern = (iteration.index() & 0xff) as u8;
        let buffer = &mut self.buffer;
        iteration.time(|| {
            buffer.fill(pattern);
            black_box(buffer.as_slice());
        });
        iteration.set_bytes(self.buffer.len() as u64);
        true
    }
}

/// Copies one buffer into another of the same size.
pub struct CopyBuffer {
    source: Vec<u8>,
    dest: Vec<u8>,
}

impl CopyBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            source: (0..size).map(|i| (i % 251) as u8).collect(),
            dest: vec![0; size],
        }
    }
}

impl Workload for CopyBuffer {
    fn run(&mut self, iteration: &mut Iteration<'_>) -> bool {
        let (source, dest) = (&self.source, &mut self.dest);
        iteration.time(|| {
            dest.copy_from_slice(source);
            black_box(dest.as_slice());
        });
        iteration.set_bytes(self.source.len() as u64);
        true
    }
}

/// Wrapping sum of every byte in the buffer.
pub struct SumBuffer {
    buffer: Vec<u8>,
    last: u64,
}

impl SumBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: (0..size).map(|i| (i % 7) as u8).collect(),
            last: 0,
        }
    }

    pub fn last_sum(&self) -> u64 {
        self.last
    }
}

impl Workload for SumBuffer {
    fn run(&mut self, iteration: &mut Iteration<'_>) -> bool {
        let buffer = &self.buffer;
        let total = iteration.time(|| {
            black_box(buffer)
                .iter()
                .fold(0u64, |acc, &b| acc.wrapping_add(b as u64))
        });
        self.last = total;
        iteration.set_bytes(self.buffer.len() as u64);
        true
    }
}

/// Reads a whole file into memory on every iteration.
///
/// Stops the test at the first read error.
pub struct ReadFile {
    path: PathBuf,
}

impl ReadFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Workload for ReadFile {
    fn run(&mut self, iteration: &mut Iteration<'_>) -> bool {
        let path = &self.path;
        match iteration.time(|| std::fs::read(path)) {
            Ok(contents) => {
                iteration.set_bytes(contents.len() as u64);
                true
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "read failed; stopping test");
                false
            }
        }
    }
}

/// Builds the named workload. `read-file` needs `file`; the others use a
/// buffer of `size` bytes.
pub fn build(
    name: &str,
    size: usize,
    file: Option<&PathBuf>,
) -> Result<Box<dyn Workload>, ReptestError> {
    match (name, file) {
        ("fill", _) => Ok(Box::new(FillBuffer::new(size))),
        ("copy", _) => Ok(Box::new(CopyBuffer::new(size))),
        ("sum", _) => Ok(Box::new(SumBuffer::new(size))),
        ("read-file", Some(path)) => Ok(Box::new(ReadFile::new(path.clone()))),
        ("read-file", None) => Err(ReptestError::MissingFile {
            name: name.to_string(),
        }),
        _ => Err(ReptestError::UnknownWorkload {
            name: name.to_string(),
        }),
    }
}
