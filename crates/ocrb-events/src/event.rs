//! ---
//! ocrb_section: "02-evidence-model"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Observational event records and run logs."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Free-form audit annotations attached to an event.
///
/// No calculator reads this map; it only travels with the event into audit trails.
pub type Metadata = IndexMap<String, serde_json::Value>;

/// Closed set of observations recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    RunStart,
    RunEnd,
    WorkUnitStart,
    WorkUnitEnd,
    Failure,
    RecoveryAttempt,
    RecoverySuccess,
    RecoveryFailed,
    IsolationStart,
    IsolationEnd,
    /// A component observed to be affected by an injected fault.
    ComponentAffected,
}

/// Classification attached to failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureClass {
    /// The system recovered without external intervention.
    AutonomouslyRecovered,
    /// The failure was recoverable in principle but was not recovered.
    RecoverableNotRecovered,
    /// The failure cannot be recovered from; it ends any isolation window.
    Irreversible,
}

impl FailureClass {
    /// Whether the failure counts towards the recoverable-failure population.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FailureClass::AutonomouslyRecovered | FailureClass::RecoverableNotRecovered
        )
    }
}

/// Canonical immutable record of an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since the Unix epoch.
    pub t_utc: f64,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_class: Option<FailureClass>,
    /// Declared stress intensity level active when the observation was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<f64>,
    /// Completion rate observed at `stress_level`, expected in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_done: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_used: Option<f64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub meta: Metadata,
}

impl Event {
    pub fn is(&self, kind: EventType) -> bool {
        self.kind == kind
    }

    /// Failure event carrying the given classification.
    pub fn is_failure_classified(&self, class: FailureClass) -> bool {
        self.kind == EventType::Failure && self.failure_class == Some(class)
    }
}

/// Current wall-clock time expressed as fractional seconds since the Unix epoch.
pub fn now_utc_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Builder for an event before it is stamped and appended to a log.
///
/// Run and workload identifiers are filled in by the owning
/// [`EventLog`](crate::EventLog); the timestamp defaults to the append time.
#[derive(Debug, Clone)]
pub struct EventDraft {
    kind: EventType,
    t_utc: Option<f64>,
    workload_id: Option<String>,
    component_id: Option<String>,
    work_unit_id: Option<String>,
    failure_id: Option<String>,
    failure_class: Option<FailureClass>,
    stress_level: Option<f64>,
    completion_rate: Option<f64>,
    work_done: Option<f64>,
    resources_used: Option<f64>,
    meta: Metadata,
}

impl EventDraft {
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            t_utc: None,
            workload_id: None,
            component_id: None,
            work_unit_id: None,
            failure_id: None,
            failure_class: None,
            stress_level: None,
            completion_rate: None,
            work_done: None,
            resources_used: None,
            meta: Metadata::new(),
        }
    }

    /// Use an explicit timestamp instead of the append time.
    pub fn at(mut self, t_utc: f64) -> Self {
        self.t_utc = Some(t_utc);
        self
    }

    /// Override the workload identifier inherited from the log.
    pub fn workload(mut self, workload_id: impl Into<String>) -> Self {
        self.workload_id = Some(workload_id.into());
        self
    }

    pub fn component(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }

    pub fn work_unit(mut self, work_unit_id: impl Into<String>) -> Self {
        self.work_unit_id = Some(work_unit_id.into());
        self
    }

    pub fn failure(mut self, failure_id: impl Into<String>, class: FailureClass) -> Self {
        self.failure_id = Some(failure_id.into());
        self.failure_class = Some(class);
        self
    }

    pub fn failure_class(mut self, class: FailureClass) -> Self {
        self.failure_class = Some(class);
        self
    }

    /// Completion evidence observed at a declared stress level.
    pub fn stress(mut self, stress_level: f64, completion_rate: f64) -> Self {
        self.stress_level = Some(stress_level);
        self.completion_rate = Some(completion_rate);
        self
    }

    pub fn stress_level(mut self, stress_level: f64) -> Self {
        self.stress_level = Some(stress_level);
        self
    }

    pub fn completion_rate(mut self, completion_rate: f64) -> Self {
        self.completion_rate = Some(completion_rate);
        self
    }

    /// Work and resource accounting for efficiency evidence.
    pub fn work(mut self, work_done: f64, resources_used: f64) -> Self {
        self.work_done = Some(work_done);
        self.resources_used = Some(resources_used);
        self
    }

    pub fn work_done(mut self, work_done: f64) -> Self {
        self.work_done = Some(work_done);
        self
    }

    pub fn resources_used(mut self, resources_used: f64) -> Self {
        self.resources_used = Some(resources_used);
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub(crate) fn stamp(self, run_id: &str, default_workload: &str) -> Event {
        Event {
            t_utc: self.t_utc.unwrap_or_else(now_utc_seconds),
            kind: self.kind,
            run_id: run_id.to_owned(),
            workload_id: Some(
                self.workload_id
                    .unwrap_or_else(|| default_workload.to_owned()),
            ),
            component_id: self.component_id,
            work_unit_id: self.work_unit_id,
            failure_id: self.failure_id,
            failure_class: self.failure_class,
            stress_level: self.stress_level,
            completion_rate: self.completion_rate,
            work_done: self.work_done,
            resources_used: self.resources_used,
            meta: self.meta,
        }
    }
}

impl From<EventType> for EventDraft {
    fn from(kind: EventType) -> Self {
        Self::new(kind)
    }
}
