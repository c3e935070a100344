//! ---
//! ocrb_section: "02-evidence-model"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Observational event records and run logs."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event::{Event, EventDraft};
use crate::validate::{validate_events, ValidationError};

/// Append-only event log owned by the run that creates it.
#[derive(Debug, Clone)]
pub struct EventLog {
    run_id: String,
    workload_id: String,
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(run_id: impl Into<String>, workload_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            workload_id: workload_id.into(),
            events: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn workload_id(&self) -> &str {
        &self.workload_id
    }

    /// Stamp the draft with this log's identifiers and append it.
    pub fn emit(&mut self, draft: impl Into<EventDraft>) -> &Event {
        let event = draft.into().stamp(&self.run_id, &self.workload_id);
        trace!(
            target: "ocrb::events",
            run_id = %self.run_id,
            kind = %event.kind,
            t_utc = event.t_utc,
            "event appended"
        );
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Borrow every event recorded so far, in append order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Owned copy of the events recorded so far.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_events(&self.events)
    }

    /// Close the log at the end of the run. The returned trace cannot be appended to.
    pub fn finish(self) -> EventTrace {
        EventTrace {
            run_id: self.run_id,
            workload_id: self.workload_id,
            events: self.events,
        }
    }
}

/// Sealed event log of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrace {
    run_id: String,
    workload_id: String,
    events: Vec<Event>,
}

impl EventTrace {
    /// Rebuild a trace from previously recorded events (e.g. a persisted log).
    pub fn from_parts(
        run_id: impl Into<String>,
        workload_id: impl Into<String>,
        events: Vec<Event>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            workload_id: workload_id.into(),
            events,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn workload_id(&self) -> &str {
        &self.workload_id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_events(&self.events)
    }

    /// Timestamp of the first event, if any.
    pub fn started_at(&self) -> Option<f64> {
        self.events.first().map(|event| event.t_utc)
    }

    /// Timestamp of the last event, if any.
    pub fn ended_at(&self) -> Option<f64> {
        self.events.last().map(|event| event.t_utc)
    }
}

impl AsRef<[Event]> for EventLog {
    fn as_ref(&self) -> &[Event] {
        self.events()
    }
}

impl AsRef<[Event]> for EventTrace {
    fn as_ref(&self) -> &[Event] {
        self.events()
    }
}
