use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ReptestError {
    #[error("Monotonic clock unavailable: {detail}")]
    ClockUnavailable { detail: String },

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },

    #[error("Unknown workload '{name}'. Supported: fill, copy, sum, read-file")]
    UnknownWorkload { name: String },

    #[error("Workload '{name}' requires --file <PATH>")]
    MissingFile { name: String },
}
