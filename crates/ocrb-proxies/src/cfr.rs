//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Cascading Failure Resistance, `CFR = 1 - C_local / C_total`.

use std::collections::BTreeSet;

use ocrb_events::{Event, EventType};
use serde::{Deserialize, Serialize};

use crate::outcome::{clamp_unit, ProxyOutcome};

const PROXY: &str = "cfr";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfrResult {
    pub outcome: ProxyOutcome,
    pub c_total: Option<u64>,
    pub c_local: Option<u64>,
    /// Distinct affected component identifiers, sorted.
    pub affected_components: Vec<String>,
}

/// Components named by `component_affected` events or by failures carrying a component id.
fn affected_components(events: &[Event]) -> BTreeSet<&str> {
    events
        .iter()
        .filter(|event| event.is(EventType::ComponentAffected) || event.is(EventType::Failure))
        .filter_map(|event| event.component_id.as_deref())
        .filter(|component| !component.is_empty())
        .collect()
}

pub fn compute_cfr(events: &[Event], c_total: Option<u64>) -> CfrResult {
    let Some(total) = c_total else {
        return CfrResult {
            outcome: ProxyOutcome::not_applicable(PROXY, "C_total not declared."),
            c_total: None,
            c_local: None,
            affected_components: Vec::new(),
        };
    };
    if total <= 1 {
        return CfrResult {
            outcome: ProxyOutcome::not_applicable(
                PROXY,
                "C_total <= 1 (single-component workload); CFR not applicable.",
            ),
            c_total: Some(total),
            c_local: None,
            affected_components: Vec::new(),
        };
    }

    let affected: Vec<String> = affected_components(events)
        .into_iter()
        .map(str::to_owned)
        .collect();
    let local = affected.len() as u64;

    let outcome = if local == 0 {
        ProxyOutcome::not_applicable(
            PROXY,
            "No affected components recorded (missing COMPONENT_AFFECTED evidence).",
        )
    } else if local > total {
        ProxyOutcome::not_applicable(
            PROXY,
            format!("C_local ({local}) > C_total ({total}); invalid component evidence."),
        )
    } else {
        ProxyOutcome::measured(clamp_unit(1.0 - local as f64 / total as f64))
    };

    CfrResult {
        outcome,
        c_total: Some(total),
        c_local: Some(local),
        affected_components: affected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrb_events::{EventDraft, EventLog, FailureClass};

    fn log_with(drafts: Vec<EventDraft>) -> EventLog {
        let mut log = EventLog::new("run", "W2-A");
        log.emit(EventType::RunStart);
        for draft in drafts {
            log.emit(draft);
        }
        log.emit(EventType::RunEnd);
        log
    }

    #[test]
    fn distinct_affected_components_reduce_resistance() {
        let log = log_with(vec![
            EventDraft::new(EventType::ComponentAffected).component("stage-3"),
            EventDraft::new(EventType::ComponentAffected).component("stage-3"),
            EventDraft::new(EventType::Failure)
                .component("store")
                .failure("crash", FailureClass::AutonomouslyRecovered),
            // Work-unit events never count as affected evidence.
            EventDraft::new(EventType::WorkUnitEnd).component("stage-9"),
        ]);
        let result = compute_cfr(log.events(), Some(5));
        assert!((result.outcome.value().unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(result.c_local, Some(2));
        assert_eq!(result.affected_components, vec!["stage-3", "store"]);
    }

    #[test]
    fn single_component_and_undeclared_totals_are_not_applicable() {
        let log = log_with(vec![
            EventDraft::new(EventType::ComponentAffected).component("a")
        ]);
        let single = compute_cfr(log.events(), Some(1));
        assert!(single.outcome.na_reason().unwrap().contains("single-component"));

        let undeclared = compute_cfr(log.events(), None);
        assert_eq!(undeclared.outcome.na_reason(), Some("C_total not declared."));
        assert_eq!(undeclared.c_local, None);
    }

    #[test]
    fn missing_evidence_discloses_zero_local() {
        let result = compute_cfr(log_with(Vec::new()).events(), Some(5));
        assert_eq!(result.outcome.value(), None);
        assert_eq!(result.c_local, Some(0));
        assert!(result
            .outcome
            .na_reason()
            .unwrap()
            .contains("No affected components"));
    }

    #[test]
    fn more_affected_than_declared_is_inconsistent() {
        let log = log_with(
            ["a", "b", "c"]
                .into_iter()
                .map(|id| EventDraft::new(EventType::ComponentAffected).component(id))
                .collect(),
        );
        let result = compute_cfr(log.events(), Some(2));
        assert_eq!(result.outcome.value(), None);
        assert_eq!(result.c_local, Some(3));
        assert!(result.outcome.na_reason().unwrap().contains("C_local (3) > C_total (2)"));
    }

    #[test]
    fn every_component_affected_scores_zero() {
        let log = log_with(vec![
            EventDraft::new(EventType::ComponentAffected).component("a"),
            EventDraft::new(EventType::ComponentAffected).component("b"),
        ]);
        assert_eq!(compute_cfr(log.events(), Some(2)).outcome.value(), Some(0.0));
    }
}
