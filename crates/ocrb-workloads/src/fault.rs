//! ---
//! ocrb_section: "07-resilience-workloads"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Stressed reference workloads and their fault hooks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Whether the pipeline may restart after a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Recoverability {
    Recoverable,
    Unrecoverable,
}

/// What interrupted a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FaultCause {
    /// The crash predicate fired before the stage did any work.
    SimulatedCrash,
    /// The dependency kept failing beyond the grace threshold.
    ExternalUnavailable { consecutive_failures: u32 },
    /// The dependency reported a failure no restart can fix.
    ExternalFatal { detail: String },
}

impl FaultCause {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        self.into()
    }

    pub fn recoverability(&self) -> Recoverability {
        match self {
            FaultCause::SimulatedCrash | FaultCause::ExternalUnavailable { .. } => {
                Recoverability::Recoverable
            }
            FaultCause::ExternalFatal { .. } => Recoverability::Unrecoverable,
        }
    }
}

impl fmt::Display for FaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCause::SimulatedCrash => f.write_str("simulated_crash"),
            FaultCause::ExternalUnavailable {
                consecutive_failures,
            } => write!(
                f,
                "external_unavailable after {consecutive_failures} consecutive failures"
            ),
            FaultCause::ExternalFatal { detail } => write!(f, "external_fatal: {detail}"),
        }
    }
}

/// Failure signal raised by a stage, tagged with its recoverability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFault {
    pub stage: u32,
    pub cause: FaultCause,
    pub recoverability: Recoverability,
}

impl PipelineFault {
    pub fn new(stage: u32, cause: FaultCause) -> Self {
        let recoverability = cause.recoverability();
        Self {
            stage,
            cause,
            recoverability,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverability == Recoverability::Recoverable
    }
}

impl fmt::Display for PipelineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fault at stage {}: {}",
            self.recoverability, self.stage, self.cause
        )
    }
}

/// One fault observed during a run and how the pipeline handled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub fault: PipelineFault,
    /// `true` when the pipeline restarted from its checkpoint, `false` when the
    /// fault ended the run.
    pub restarted: bool,
    /// Stage the pipeline resumed at after restarting.
    pub resumed_at: Option<u32>,
}
