//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Value of a normalised proxy, or the disclosed reason it could not be computed.
///
/// `NotApplicable` is never interchangeable with zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProxyOutcome {
    Measured { value: f64 },
    NotApplicable { reason: String },
}

impl ProxyOutcome {
    pub fn measured(value: f64) -> Self {
        ProxyOutcome::Measured { value }
    }

    /// Build an N/A outcome and record the reason at debug level.
    pub fn not_applicable(proxy: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(target: "ocrb::proxies", proxy, reason = %reason, "proxy not applicable");
        ProxyOutcome::NotApplicable { reason }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            ProxyOutcome::Measured { value } => Some(*value),
            ProxyOutcome::NotApplicable { .. } => None,
        }
    }

    pub fn na_reason(&self) -> Option<&str> {
        match self {
            ProxyOutcome::Measured { .. } => None,
            ProxyOutcome::NotApplicable { reason } => Some(reason),
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, ProxyOutcome::Measured { .. })
    }
}

/// Clamp into the unit interval.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
