//! ---
//! ocrb_section: "02-evidence-model"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Observational event records and run logs."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use thiserror::Error;

use crate::event::{Event, EventType};

/// Structural violations that make an event log unusable for scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("event log is empty")]
    Empty,
    #[error("missing run_start event")]
    MissingRunStart,
    #[error("run_end at position {run_end} occurs before the first run_start at position {run_start}")]
    RunEndBeforeRunStart { run_end: usize, run_start: usize },
    #[error("completion_rate out of bounds at position {index}: {value}")]
    CompletionRateOutOfBounds { index: usize, value: f64 },
    #[error("stress_level must be numeric at position {index}: {value}")]
    NonNumericStressLevel { index: usize, value: f64 },
}

/// Check the structural soundness of an event sequence.
///
/// The checks run in a fixed order and the first violation is reported.
pub fn validate_events(events: &[Event]) -> Result<(), ValidationError> {
    if events.is_empty() {
        return Err(ValidationError::Empty);
    }

    let run_start = events
        .iter()
        .position(|event| event.is(EventType::RunStart))
        .ok_or(ValidationError::MissingRunStart)?;

    if let Some(run_end) = events
        .iter()
        .position(|event| event.is(EventType::RunEnd))
        .filter(|run_end| *run_end < run_start)
    {
        return Err(ValidationError::RunEndBeforeRunStart { run_end, run_start });
    }

    for (index, event) in events.iter().enumerate() {
        if let Some(value) = event.completion_rate {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::CompletionRateOutOfBounds { index, value });
            }
        }
        if let Some(value) = event.stress_level {
            if !value.is_finite() {
                return Err(ValidationError::NonNumericStressLevel { index, value });
            }
        }
    }

    Ok(())
}
