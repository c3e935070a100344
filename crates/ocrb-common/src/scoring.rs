//! ---
//! ocrb_section: "01-core-functionality"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Shared primitives and utilities for the benchmark core."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use std::fmt;

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The five behavioural proxies scored for every run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProxyKind {
    /// Graceful Degradation Score.
    Gds,
    /// Autonomous Recovery Rate.
    Arr,
    /// Isolation Survival Time.
    Ist,
    /// Resource Efficiency under Constraint.
    Rec,
    /// Cascading Failure Resistance.
    Cfr,
}

impl ProxyKind {
    /// Static label used in disclosures and metric keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Gds => "gds",
            ProxyKind::Arr => "arr",
            ProxyKind::Ist => "ist",
            ProxyKind::Rec => "rec",
            ProxyKind::Cfr => "cfr",
        }
    }
}

/// Weight table used to fold proxy values into the Operational Resilience Index.
///
/// Iteration order follows insertion order so disclosures list weights the way
/// they were declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, f64>", into = "IndexMap<String, f64>")]
pub struct OriWeights(IndexMap<ProxyKind, f64>);

impl OriWeights {
    /// Weight applied to every proxy when none are declared.
    pub const EQUAL_WEIGHT: f64 = 0.2;

    /// Build a weight table from explicit `(proxy, weight)` pairs.
    pub fn new(weights: impl IntoIterator<Item = (ProxyKind, f64)>) -> Self {
        Self(weights.into_iter().collect())
    }

    /// Equal weighting across all five proxies.
    pub fn equal() -> Self {
        Self::new(ProxyKind::iter().map(|kind| (kind, Self::EQUAL_WEIGHT)))
    }

    pub fn get(&self, kind: ProxyKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProxyKind, f64)> + '_ {
        self.0.iter().map(|(kind, weight)| (*kind, *weight))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject tables that cannot produce a meaningful index.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(anyhow!("ORI weight table must contain at least one proxy"));
        }
        for (kind, weight) in &self.0 {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(anyhow!(
                    "ORI weight for '{}' must be a finite non-negative number, got {}",
                    kind,
                    weight
                ));
            }
        }
        Ok(())
    }
}

impl Default for OriWeights {
    fn default() -> Self {
        Self::equal()
    }
}

impl TryFrom<IndexMap<String, f64>> for OriWeights {
    type Error = String;

    fn try_from(raw: IndexMap<String, f64>) -> std::result::Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(key, weight)| {
                key.parse::<ProxyKind>()
                    .map(|kind| (kind, weight))
                    .map_err(|_| format!("unknown proxy '{key}' in ORI weights"))
            })
            .collect::<std::result::Result<IndexMap<_, _>, _>>()
            .map(Self)
    }
}

impl From<OriWeights> for IndexMap<String, f64> {
    fn from(weights: OriWeights) -> Self {
        weights
            .0
            .into_iter()
            .map(|(kind, weight)| (kind.as_str().to_owned(), weight))
            .collect()
    }
}

impl fmt::Display for OriWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|(kind, weight)| format!("{kind}={weight}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{rendered}}}")
    }
}
