//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use indexmap::IndexMap;
use ocrb_common::{DeclaredParameters, OriWeights, ProxyKind};
use ocrb_events::{Event, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::arr::{compute_arr, ArrResult};
use crate::cfr::{compute_cfr, CfrResult};
use crate::gds::{compute_gds, GdsResult};
use crate::ist::{compute_ist, IstResult};
use crate::ori::{compute_ori, OriResult, ProxyValues};
use crate::outcome::ProxyOutcome;
use crate::rec::{compute_rec, RecResult};

/// Structural problems that stop scoring a run entirely.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProxyError {
    #[error("stressed trace is structurally invalid: {0}")]
    InvalidStressedTrace(#[source] ValidationError),
    #[error("baseline trace is structurally invalid: {0}")]
    InvalidBaselineTrace(#[source] ValidationError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Plain values of one scored run, `None` where a proxy was N/A.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyScores {
    pub gds: Option<f64>,
    pub arr: Option<f64>,
    pub ist: Option<f64>,
    pub rec: Option<f64>,
    pub cfr: Option<f64>,
    pub ori: Option<f64>,
}

/// Every proxy result for one stressed run, with its ORI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxySet {
    pub gds: GdsResult,
    pub arr: ArrResult,
    pub ist: IstResult,
    pub rec: RecResult,
    pub cfr: CfrResult,
    pub ori: OriResult,
}

impl ProxySet {
    /// Validate both traces, then compute all five proxies and the aggregate.
    ///
    /// A structurally invalid trace is an error; missing evidence is not, it
    /// shows up as N/A outcomes inside the set.
    pub fn compute(
        stressed: &[Event],
        baseline: &[Event],
        declared: &DeclaredParameters,
        weights: &OriWeights,
    ) -> Result<Self> {
        ocrb_events::validate_events(stressed).map_err(|err| {
            warn!(target: "ocrb::proxies", error = %err, "rejecting stressed trace");
            ProxyError::InvalidStressedTrace(err)
        })?;
        ocrb_events::validate_events(baseline).map_err(|err| {
            warn!(target: "ocrb::proxies", error = %err, "rejecting baseline trace");
            ProxyError::InvalidBaselineTrace(err)
        })?;

        let gds = compute_gds(stressed, declared.stress_levels.as_deref());
        let arr = compute_arr(stressed);
        let ist = compute_ist(stressed, declared.isolation_duration_s);
        let rec = compute_rec(baseline, stressed, declared.baseline_min_work);
        let cfr = compute_cfr(stressed, declared.component_total);

        let values: ProxyValues = [
            (ProxyKind::Gds, gds.outcome.value()),
            (ProxyKind::Arr, arr.outcome.value()),
            (ProxyKind::Ist, ist.outcome.value()),
            (ProxyKind::Rec, rec.outcome.value()),
            (ProxyKind::Cfr, cfr.outcome.value()),
        ]
        .into_iter()
        .collect();
        let ori = compute_ori(&values, Some(weights));

        let set = Self {
            gds,
            arr,
            ist,
            rec,
            cfr,
            ori,
        };
        info!(
            target: "ocrb::proxies",
            events = stressed.len(),
            measured = set.outcomes().filter(|(_, outcome)| outcome.is_measured()).count(),
            ori = ?set.ori.outcome.value(),
            "proxy set computed"
        );
        Ok(set)
    }

    /// The five proxy outcomes in canonical order.
    pub fn outcomes(&self) -> impl Iterator<Item = (ProxyKind, &ProxyOutcome)> + '_ {
        [
            (ProxyKind::Gds, &self.gds.outcome),
            (ProxyKind::Arr, &self.arr.outcome),
            (ProxyKind::Ist, &self.ist.outcome),
            (ProxyKind::Rec, &self.rec.outcome),
            (ProxyKind::Cfr, &self.cfr.outcome),
        ]
        .into_iter()
    }

    /// Proxy values in the shape accepted by [`compute_ori`].
    pub fn values(&self) -> ProxyValues {
        self.outcomes()
            .map(|(kind, outcome)| (kind, outcome.value()))
            .collect()
    }

    pub fn scores(&self) -> ProxyScores {
        ProxyScores {
            gds: self.gds.outcome.value(),
            arr: self.arr.outcome.value(),
            ist: self.ist.outcome.value(),
            rec: self.rec.outcome.value(),
            cfr: self.cfr.outcome.value(),
            ori: self.ori.outcome.value(),
        }
    }

    /// Disclosure lines for every N/A result, ORI included, keyed by name.
    pub fn na_reasons(&self) -> IndexMap<&'static str, &str> {
        self.outcomes()
            .map(|(kind, outcome)| (kind.as_str(), outcome))
            .chain(std::iter::once(("ori", &self.ori.outcome)))
            .filter_map(|(name, outcome)| outcome.na_reason().map(|reason| (name, reason)))
            .collect()
    }
}
