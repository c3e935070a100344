//! ---
//! ocrb_section: "03-persistence-logging"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Checkpoint and event trace persistence."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Durable state for OCRB runs: the pipeline's next-stage checkpoint and
//! the JSONL files that event traces are written to and reloaded from.

use std::path::PathBuf;

/// Result alias used throughout the persistence crate.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Error type for the persistence subsystem.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Wrapper for IO errors encountered while reading/writing persistence files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Wrapper for JSON serialization issues.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// A checkpoint file exists but its content cannot be trusted.
    #[error("corrupt checkpoint at {}: {reason}", path.display())]
    CorruptCheckpoint {
        /// Location of the unreadable checkpoint.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },
    /// An event carries a NaN or infinite number, which JSON cannot represent.
    #[error("event {index} has non-finite {field}: {value}")]
    NonFiniteField {
        /// Position of the event in the trace.
        index: usize,
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A trace file without the leading header line.
    #[error("trace file {} has no header", path.display())]
    MissingTraceHeader {
        /// Location of the trace file.
        path: PathBuf,
    },
}

pub mod checkpoint;
pub mod trace_log;

pub use checkpoint::{Checkpoint, CheckpointStore, CHECKPOINT_FILE};
pub use trace_log::{load_trace, write_trace, EventTraceReader, EventTraceWriter, TraceHeader};
