//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Resource Efficiency under Constraint.
//!
//! Efficiency is work per resource unit. The stressed run is normalised by the
//! baseline (SP-0) run: `REC = clamp(E_stress / E_base, 0, 1)`.

use ocrb_events::Event;
use serde::{Deserialize, Serialize};

use crate::outcome::{clamp_unit, ProxyOutcome};

const PROXY: &str = "rec";

/// Summed work and resource accounting of one trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkTotals {
    pub work_done: f64,
    pub resources_used: f64,
}

impl WorkTotals {
    pub fn from_events(events: &[Event]) -> Self {
        events.iter().fold(Self::default(), |totals, event| Self {
            work_done: totals.work_done + event.work_done.unwrap_or(0.0),
            resources_used: totals.resources_used + event.resources_used.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecResult {
    pub outcome: ProxyOutcome,
    pub e_base: Option<f64>,
    pub e_stress: Option<f64>,
    pub baseline: WorkTotals,
    pub stressed: WorkTotals,
}

pub fn compute_rec(baseline: &[Event], stressed: &[Event], baseline_min_work: f64) -> RecResult {
    let base = WorkTotals::from_events(baseline);
    let stress = WorkTotals::from_events(stressed);
    let result = |outcome, e_base, e_stress| RecResult {
        outcome,
        e_base,
        e_stress,
        baseline: base,
        stressed: stress,
    };

    if base.work_done < baseline_min_work {
        let reason = format!(
            "Baseline work below minimum threshold: {} < {}",
            base.work_done, baseline_min_work
        );
        return result(ProxyOutcome::not_applicable(PROXY, reason), None, None);
    }
    if base.resources_used <= 0.0 {
        return result(
            ProxyOutcome::not_applicable(
                PROXY,
                "Baseline resources_used is zero/undefined; cannot compute E_base.",
            ),
            None,
            None,
        );
    }

    let e_base = base.work_done / base.resources_used;
    if e_base <= 0.0 {
        return result(
            ProxyOutcome::not_applicable(
                PROXY,
                "Baseline efficiency is zero/undefined; cannot normalize REC.",
            ),
            None,
            None,
        );
    }
    if stress.resources_used <= 0.0 {
        return result(
            ProxyOutcome::not_applicable(
                PROXY,
                "Stressed resources_used is zero/undefined; cannot compute E_stress.",
            ),
            Some(e_base),
            None,
        );
    }

    let e_stress = stress.work_done / stress.resources_used;
    result(
        ProxyOutcome::measured(clamp_unit(e_stress / e_base)),
        Some(e_base),
        Some(e_stress),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrb_events::{EventDraft, EventLog, EventType};

    fn log_with(work: f64, resources: f64) -> EventLog {
        let mut log = EventLog::new("run", "W1-A");
        log.emit(EventType::RunStart);
        // Split across two events to exercise summation.
        log.emit(EventDraft::new(EventType::WorkUnitEnd).work(work / 2.0, resources / 2.0));
        log.emit(EventDraft::new(EventType::WorkUnitEnd).work(work / 2.0, resources / 2.0));
        log.emit(EventType::RunEnd);
        log
    }

    #[test]
    fn stressed_efficiency_relative_to_baseline() {
        let result = compute_rec(
            log_with(100.0, 50.0).events(),
            log_with(40.0, 50.0).events(),
            0.0,
        );
        assert_eq!(result.e_base, Some(2.0));
        assert_eq!(result.e_stress, Some(0.8));
        assert!((result.outcome.value().unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(result.baseline.work_done, 100.0);
    }

    #[test]
    fn zero_stressed_work_is_a_valid_zero() {
        let result = compute_rec(
            log_with(100.0, 50.0).events(),
            log_with(0.0, 50.0).events(),
            0.0,
        );
        assert_eq!(result.outcome.value(), Some(0.0));
    }

    #[test]
    fn improvement_over_baseline_is_capped() {
        let result = compute_rec(
            log_with(100.0, 50.0).events(),
            log_with(300.0, 50.0).events(),
            0.0,
        );
        assert_eq!(result.outcome.value(), Some(1.0));
    }

    #[test]
    fn each_baseline_gate_has_its_own_reason() {
        let stressed = log_with(40.0, 50.0);
        let below = compute_rec(log_with(10.0, 50.0).events(), stressed.events(), 20.0);
        assert!(below.outcome.na_reason().unwrap().contains("minimum threshold"));

        let no_resources = compute_rec(log_with(100.0, 0.0).events(), stressed.events(), 0.0);
        assert!(no_resources
            .outcome
            .na_reason()
            .unwrap()
            .contains("cannot compute E_base"));

        let no_work = compute_rec(log_with(0.0, 50.0).events(), stressed.events(), 0.0);
        assert!(no_work
            .outcome
            .na_reason()
            .unwrap()
            .contains("cannot normalize REC"));
    }

    #[test]
    fn stressed_without_resources_discloses_baseline() {
        let result = compute_rec(
            log_with(100.0, 50.0).events(),
            log_with(10.0, 0.0).events(),
            0.0,
        );
        assert_eq!(result.outcome.value(), None);
        assert_eq!(result.e_base, Some(2.0));
        assert!(result
            .outcome
            .na_reason()
            .unwrap()
            .contains("cannot compute E_stress"));
    }
}
