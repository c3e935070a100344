//! ---
//! ocrb_section: "02-evidence-model"
//! ocrb_subsection: "integration-tests"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Contract tests for the observational event model."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use ocrb_events::{
    validate_events, EventDraft, EventLog, EventTrace, EventType, FailureClass, ValidationError,
};
use serde_json::json;

fn reference_run() -> EventLog {
    let mut log = EventLog::new("run-01", "W2-A");
    log.emit(EventDraft::new(EventType::RunStart).at(1000.0));
    log.emit(EventDraft::new(EventType::WorkUnitEnd).at(1001.0).stress(0.1, 1.0));
    log.emit(
        EventDraft::new(EventType::Failure)
            .at(1002.0)
            .failure("f1", FailureClass::AutonomouslyRecovered)
            .component("node-1")
            .meta("injector", json!({"kind": "crash", "stage": 7})),
    );
    log.emit(EventDraft::new(EventType::IsolationStart).at(1010.0));
    log.emit(EventDraft::new(EventType::IsolationEnd).at(1070.0));
    log.emit(EventDraft::new(EventType::RunEnd).at(1080.0));
    log
}

#[test]
fn trace_serialises_and_reloads_identically() {
    let trace = reference_run().finish();
    let json = serde_json::to_string(&trace).unwrap();
    let reloaded: EventTrace = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, trace);
    assert!(reloaded.validate().is_ok());
}

#[test]
fn metadata_is_preserved_but_never_required() {
    let trace = reference_run().finish();
    let failure = trace
        .events()
        .iter()
        .find(|event| event.is(EventType::Failure))
        .unwrap();
    assert_eq!(failure.meta["injector"]["stage"], json!(7));

    let stripped: Vec<_> = trace
        .events()
        .iter()
        .cloned()
        .map(|mut event| {
            event.meta.clear();
            event
        })
        .collect();
    assert!(validate_events(&stripped).is_ok());
}

#[test]
fn rebuilt_trace_without_run_start_fails_validation() {
    let trace = reference_run().finish();
    let events: Vec<_> = trace
        .events()
        .iter()
        .filter(|event| !event.is(EventType::RunStart))
        .cloned()
        .collect();
    let rebuilt = EventTrace::from_parts("run-01", "W2-A", events);
    assert_eq!(rebuilt.validate(), Err(ValidationError::MissingRunStart));
}
