//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Graceful Degradation Score.
//!
//! `GDS = (1/n) * Σ Ci` over every event carrying both a stress level and a
//! completion rate. Duplicate levels each count once per observation.

use ocrb_events::Event;
use serde::{Deserialize, Serialize};

use crate::outcome::{clamp_unit, ProxyOutcome};

const PROXY: &str = "gds";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdsResult {
    pub outcome: ProxyOutcome,
    pub n_levels: usize,
    /// Observed levels, ascending, paired index-wise with `completion_rates`.
    pub stress_levels: Vec<f64>,
    pub completion_rates: Vec<f64>,
    /// Declared levels with no matching observation.
    pub missing_levels: Vec<f64>,
}

pub fn compute_gds(events: &[Event], expected_levels: Option<&[f64]>) -> GdsResult {
    let mut pairs: Vec<(f64, f64)> = events
        .iter()
        .filter_map(|event| Some((event.stress_level?, event.completion_rate?)))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n_levels = pairs.len();
    let (stress_levels, completion_rates): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
    let disclose = |outcome, missing_levels| GdsResult {
        outcome,
        n_levels,
        stress_levels: stress_levels.clone(),
        completion_rates: completion_rates.clone(),
        missing_levels,
    };

    if pairs.is_empty() {
        return disclose(
            ProxyOutcome::not_applicable(
                PROXY,
                "no (stress_level, completion_rate) evidence found in events",
            ),
            Vec::new(),
        );
    }

    if let Some(rate) = completion_rates
        .iter()
        .find(|rate| !(0.0..=1.0).contains(*rate))
    {
        return disclose(
            ProxyOutcome::not_applicable(PROXY, format!("completion_rate out of bounds: {rate}")),
            Vec::new(),
        );
    }

    if let Some(expected) = expected_levels {
        let missing: Vec<f64> = expected
            .iter()
            .copied()
            .filter(|level| !stress_levels.contains(level))
            .collect();
        if !missing.is_empty() {
            return disclose(
                ProxyOutcome::not_applicable(
                    PROXY,
                    format!("missing declared stress levels: {missing:?}"),
                ),
                missing,
            );
        }
    }

    let mean = completion_rates.iter().sum::<f64>() / n_levels as f64;
    disclose(ProxyOutcome::measured(clamp_unit(mean)), Vec::new())
}
