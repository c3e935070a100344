//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Autonomous Recovery Rate, `ARR = Fa / Fr`.

use ocrb_events::{Event, EventType, FailureClass};
use serde::{Deserialize, Serialize};

use crate::outcome::ProxyOutcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrResult {
    pub outcome: ProxyOutcome,
    /// Recoverable failures observed, recovered or not.
    pub fr: u64,
    /// Failures recovered without external intervention.
    pub fa: u64,
}

pub fn compute_arr(events: &[Event]) -> ArrResult {
    let (fr, fa) = events
        .iter()
        .filter(|event| event.is(EventType::Failure))
        .filter_map(|event| event.failure_class)
        .filter(FailureClass::is_recoverable)
        .fold((0u64, 0u64), |(fr, fa), class| {
            let recovered = u64::from(class == FailureClass::AutonomouslyRecovered);
            (fr + 1, fa + recovered)
        });

    if fr == 0 {
        return ArrResult {
            outcome: ProxyOutcome::not_applicable("arr", "Fr=0 (no recoverable failures observed)"),
            fr,
            fa,
        };
    }

    ArrResult {
        outcome: ProxyOutcome::measured(fa as f64 / fr as f64),
        fr,
        fa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrb_events::{EventDraft, EventLog};

    fn log_with(classes: &[FailureClass]) -> EventLog {
        let mut log = EventLog::new("run", "W2-A");
        log.emit(EventType::RunStart);
        for (idx, class) in classes.iter().enumerate() {
            log.emit(EventDraft::new(EventType::Failure).failure(format!("f{idx}"), *class));
        }
        log.emit(EventType::RunEnd);
        log
    }

    #[test]
    fn no_recoverable_failures_is_not_applicable() {
        let result = compute_arr(log_with(&[FailureClass::Irreversible]).events());
        assert_eq!(result.outcome.value(), None);
        assert!(result
            .outcome
            .na_reason()
            .unwrap()
            .contains("no recoverable failures"));
        assert_eq!((result.fr, result.fa), (0, 0));
    }

    #[test]
    fn all_recovered_scores_one_and_none_scores_zero() {
        let all = compute_arr(
            log_with(&[
                FailureClass::AutonomouslyRecovered,
                FailureClass::AutonomouslyRecovered,
            ])
            .events(),
        );
        assert_eq!(all.outcome.value(), Some(1.0));

        let none = compute_arr(log_with(&[FailureClass::RecoverableNotRecovered]).events());
        assert_eq!(none.outcome.value(), Some(0.0));
    }

    #[test]
    fn unclassified_and_irreversible_failures_are_ignored() {
        let mut log = log_with(&[
            FailureClass::AutonomouslyRecovered,
            FailureClass::RecoverableNotRecovered,
            FailureClass::RecoverableNotRecovered,
            FailureClass::Irreversible,
        ]);
        log.emit(EventType::Failure);
        // A classification on a non-failure event does not count.
        log.emit(
            EventDraft::new(EventType::RecoveryAttempt)
                .failure_class(FailureClass::AutonomouslyRecovered),
        );
        let result = compute_arr(log.events());
        assert_eq!((result.fr, result.fa), (3, 1));
        assert!((result.outcome.value().unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }
}
