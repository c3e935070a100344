//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Operational Resilience Index.
//!
//! ORI is the weighted sum of the five proxies. It propagates N/A instead of
//! substituting zero: one missing or absent weighted proxy voids the index.

use indexmap::IndexMap;
use ocrb_common::{OriWeights, ProxyKind};
use serde::{Deserialize, Serialize};

use crate::outcome::{clamp_unit, ProxyOutcome};

const PROXY: &str = "ori";

/// Proxy values keyed by proxy; `None` marks an N/A proxy.
pub type ProxyValues = IndexMap<ProxyKind, Option<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriResult {
    pub outcome: ProxyOutcome,
    /// Weights actually applied.
    pub weights: OriWeights,
}

/// Fold proxy values into ORI. Equal weights apply when `weights` is `None`.
pub fn compute_ori(proxies: &ProxyValues, weights: Option<&OriWeights>) -> OriResult {
    let weights = weights.cloned().unwrap_or_default();

    let missing: Vec<&str> = weights
        .iter()
        .map(|(kind, _)| kind)
        .filter(|kind| !proxies.contains_key(kind))
        .map(|kind| kind.as_str())
        .collect();
    if !missing.is_empty() {
        return OriResult {
            outcome: ProxyOutcome::not_applicable(PROXY, format!("missing proxies: {missing:?}")),
            weights,
        };
    }

    let absent: Vec<&str> = weights
        .iter()
        .map(|(kind, _)| kind)
        .filter(|kind| matches!(proxies.get(kind), Some(None)))
        .map(|kind| kind.as_str())
        .collect();
    if !absent.is_empty() {
        return OriResult {
            outcome: ProxyOutcome::not_applicable(
                PROXY,
                format!("ORI N/A because proxies N/A: {absent:?}"),
            ),
            weights,
        };
    }

    let ori: f64 = weights
        .iter()
        .filter_map(|(kind, weight)| proxies.get(&kind).copied().flatten().map(|v| v * weight))
        .sum();

    OriResult {
        outcome: ProxyOutcome::measured(clamp_unit(ori)),
        weights,
    }
}
