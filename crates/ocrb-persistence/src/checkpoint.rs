//! ---
//! ocrb_section: "03-persistence-logging"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Checkpoint and event trace persistence."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{PersistenceError, Result};

/// File name of the checkpoint inside a run directory.
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Durable record of the next pipeline stage to execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Index of the first stage not yet known to be complete.
    #[serde(default)]
    pub next_stage: u32,
}

/// Single-writer checkpoint file for one run directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the checkpoint, so readers see either the previous or the new record.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store rooted at `run_dir/checkpoint.json`.
    pub fn for_run_dir(run_dir: impl AsRef<Path>) -> Self {
        Self {
            path: run_dir.as_ref().join(CHECKPOINT_FILE),
        }
    }

    /// Store at an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the checkpoint file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the checkpoint, `None` when it has never been written.
    ///
    /// Unparsable content, including negative or fractional stage indices, is
    /// reported as [`PersistenceError::CorruptCheckpoint`] rather than being
    /// mistaken for a fresh start.
    pub fn load(&self) -> Result<Option<Checkpoint>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        parse_checkpoint(&bytes).map(Some).map_err(|reason| {
            warn!(
                target: "ocrb::persistence",
                path = %self.path.display(),
                error = %reason,
                "checkpoint is corrupt"
            );
            PersistenceError::CorruptCheckpoint {
                path: self.path.clone(),
                reason,
            }
        })
    }

    /// Resume point recorded in the checkpoint, or stage 0 when absent.
    pub fn load_next_stage(&self) -> Result<u32> {
        Ok(self.load()?.unwrap_or_default().next_stage)
    }

    /// Atomically replace the checkpoint with `next_stage`.
    pub fn save(&self, next_stage: u32) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, &Checkpoint { next_stage })?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;

        debug!(
            target: "ocrb::persistence",
            path = %self.path.display(),
            next_stage,
            "checkpoint saved"
        );
        Ok(())
    }

    /// Delete the checkpoint so the next run starts cold.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Only a JSON object is a checkpoint; serde would otherwise also accept the
/// sequence form `[k]`.
fn parse_checkpoint(bytes: &[u8]) -> std::result::Result<Checkpoint, String> {
    match serde_json::from_slice::<Value>(bytes).map_err(|err| err.to_string())? {
        object @ Value::Object(_) => serde_json::from_value(object).map_err(|err| err.to_string()),
        other => Err(format!("expected a JSON object, found {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
