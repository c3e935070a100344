//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "integration-tests"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Seeded sweeps over the proxy calculators' documented properties."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use ocrb_common::{OriWeights, ProxyKind};
use ocrb_events::{EventDraft, EventLog, EventType, FailureClass};
use ocrb_proxies::{compute_arr, compute_gds, compute_ori, ProxyValues};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SWEEPS: u64 = 64;

fn run_log() -> EventLog {
    let mut log = EventLog::new("sweep", "W1-A");
    log.emit(EventType::RunStart);
    log
}

#[test]
fn gds_equals_mean_of_in_range_rates() {
    for seed in 0..SWEEPS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut log = run_log();
        let count = rng.gen_range(1..12);
        let rates: Vec<f64> = (0..count).map(|_| rng.gen_range(0.0..=1.0)).collect();
        for (idx, rate) in rates.iter().enumerate() {
            log.emit(EventDraft::new(EventType::WorkUnitEnd).stress(idx as f64 * 0.1, *rate));
        }
        let expected = rates.iter().sum::<f64>() / rates.len() as f64;
        let value = compute_gds(log.events(), None).outcome.value().unwrap();
        assert!((value - expected).abs() < 1e-9, "seed {seed}");
    }
}

#[test]
fn gds_single_out_of_range_rate_is_never_partially_credited() {
    for seed in 0..SWEEPS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut log = run_log();
        let count = rng.gen_range(1..8);
        let poisoned = rng.gen_range(0..count);
        for idx in 0..count {
            let rate = if idx == poisoned {
                rng.gen_range(1.01..5.0)
            } else {
                rng.gen_range(0.0..=1.0)
            };
            log.emit(EventDraft::new(EventType::WorkUnitEnd).stress(0.1, rate));
        }
        let result = compute_gds(log.events(), None);
        assert_eq!(result.outcome.value(), None, "seed {seed}");
        assert!(result.outcome.na_reason().unwrap().contains("out of bounds"));
    }
}

#[test]
fn arr_is_ratio_of_autonomous_to_recoverable() {
    for seed in 0..SWEEPS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut log = run_log();
        let (mut fr, mut fa) = (0u64, 0u64);
        for idx in 0..rng.gen_range(0..20) {
            let class = match rng.gen_range(0..3) {
                0 => FailureClass::AutonomouslyRecovered,
                1 => FailureClass::RecoverableNotRecovered,
                _ => FailureClass::Irreversible,
            };
            fr += u64::from(class.is_recoverable());
            fa += u64::from(class == FailureClass::AutonomouslyRecovered);
            log.emit(EventDraft::new(EventType::Failure).failure(format!("f{idx}"), class));
        }
        let result = compute_arr(log.events());
        assert_eq!((result.fr, result.fa), (fr, fa), "seed {seed}");
        match fr {
            0 => assert!(result.outcome.na_reason().is_some()),
            _ => assert_eq!(result.outcome.value(), Some(fa as f64 / fr as f64)),
        }
    }
}

#[test]
fn ori_stays_in_unit_interval_and_propagates_absence() {
    for seed in 0..SWEEPS {
        let mut rng = StdRng::seed_from_u64(seed);
        let weights = OriWeights::new([
            (ProxyKind::Gds, rng.gen_range(0.0..1.0)),
            (ProxyKind::Arr, rng.gen_range(0.0..1.0)),
            (ProxyKind::Ist, rng.gen_range(0.0..1.0)),
            (ProxyKind::Rec, rng.gen_range(0.0..1.0)),
            (ProxyKind::Cfr, rng.gen_range(0.0..1.0)),
        ]);
        let mut values: ProxyValues = weights
            .iter()
            .map(|(kind, _)| (kind, Some(rng.gen_range(0.0..=1.0))))
            .collect();

        let value = compute_ori(&values, Some(&weights)).outcome.value().unwrap();
        assert!((0.0..=1.0).contains(&value), "seed {seed}");

        values.insert(ProxyKind::Rec, None);
        assert_eq!(compute_ori(&values, Some(&weights)).outcome.value(), None);
    }
}
