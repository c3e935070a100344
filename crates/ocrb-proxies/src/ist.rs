//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Isolation Survival Time.
//!
//! The window opens at the first `isolation_start` and closes at the first
//! later `isolation_end`, irreversible failure, or `run_end`, scanning in log
//! order. `IST = clamp(survival / declared_duration, 0, 1)`.

use ocrb_events::{Event, EventType, FailureClass};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::outcome::{clamp_unit, ProxyOutcome};

const PROXY: &str = "ist";

/// Disclosed when the window never closed before the trace ended.
pub const END_OF_OBSERVATION_DISCLOSURE: &str = "weak signal: isolation window never closed; survival assumed through the last observed event";

/// What closed the isolation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IsolationTermination {
    IsolationEnd,
    IrreversibleFailure,
    RunEnd,
    /// No terminating event; survival extends to the last event timestamp.
    EndOfObservation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IstResult {
    pub outcome: ProxyOutcome,
    pub isolation_duration_declared: Option<f64>,
    pub survival_time_observed: Option<f64>,
    pub termination: Option<IsolationTermination>,
    /// Confidence caveat attached to an otherwise measured value.
    pub disclosure: Option<String>,
}

impl IstResult {
    fn not_applicable(declared: Option<f64>, reason: &str) -> Self {
        Self {
            outcome: ProxyOutcome::not_applicable(PROXY, reason),
            isolation_duration_declared: declared,
            survival_time_observed: None,
            termination: None,
            disclosure: None,
        }
    }
}

fn termination_of(event: &Event) -> Option<IsolationTermination> {
    match event.kind {
        EventType::IsolationEnd => Some(IsolationTermination::IsolationEnd),
        EventType::RunEnd => Some(IsolationTermination::RunEnd),
        EventType::Failure if event.failure_class == Some(FailureClass::Irreversible) => {
            Some(IsolationTermination::IrreversibleFailure)
        }
        _ => None,
    }
}

pub fn compute_ist(events: &[Event], isolation_duration_declared: Option<f64>) -> IstResult {
    let declared = match isolation_duration_declared {
        Some(duration) if duration > 0.0 => duration,
        other => {
            return IstResult::not_applicable(
                other,
                "Missing or invalid declared isolation duration.",
            )
        }
    };

    let Some(start_idx) = events
        .iter()
        .position(|event| event.is(EventType::IsolationStart))
    else {
        return IstResult::not_applicable(
            Some(declared),
            "No isolation_start event observed (IST not applicable).",
        );
    };
    let started_at = events[start_idx].t_utc;

    let closing = events[start_idx + 1..]
        .iter()
        .find_map(|event| termination_of(event).map(|kind| (event.t_utc, kind)));

    let (ended_at, termination, disclosure) = match closing {
        Some((t_utc, kind)) => (t_utc, kind, None),
        None => {
            let last = events.last().map_or(started_at, |event| event.t_utc);
            (
                last,
                IsolationTermination::EndOfObservation,
                Some(END_OF_OBSERVATION_DISCLOSURE.to_owned()),
            )
        }
    };

    let survival = (ended_at - started_at).max(0.0);
    IstResult {
        outcome: ProxyOutcome::measured(clamp_unit(survival / declared)),
        isolation_duration_declared: Some(declared),
        survival_time_observed: Some(survival),
        termination: Some(termination),
        disclosure,
    }
}
