//! ---
//! ocrb_section: "02-evidence-model"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Observational event records and run logs."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Canonical observational record for OCRB runs.
//!
//! Metrics are computed from these events only (plus declared parameters).
//! A run appends to an [`EventLog`] while it executes and seals it into an
//! [`EventTrace`] when it ends.

pub mod event;
pub mod log;
pub mod validate;

pub use event::{now_utc_seconds, Event, EventDraft, EventType, FailureClass, Metadata};
pub use log::{EventLog, EventTrace};
pub use validate::{validate_events, ValidationError};
