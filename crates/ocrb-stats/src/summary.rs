//! ---
//! ocrb_section: "06-statistics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Cross-run statistical summaries of proxy values."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use ocrb_proxies::ProxyScores;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

/// Two-sided normal critical value for a 95% interval.
pub const Z_95: f64 = 1.96;

/// Summary of one proxy across repeated runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub mean: Option<f64>,
    /// Sample standard deviation (divisor `n - 1`).
    pub std: Option<f64>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,
    pub n_included: usize,
    pub n_na: usize,
}

impl SummaryStatistics {
    fn empty(n_na: usize) -> Self {
        Self {
            mean: None,
            std: None,
            ci95_low: None,
            ci95_high: None,
            n_included: 0,
            n_na,
        }
    }
}

/// Reduce per-run values, `None` for N/A, into a [`SummaryStatistics`].
///
/// The interval uses the normal approximation `mean ± 1.96·std/√n` with both
/// bounds clamped to `[0, 1]`. A single included value yields a zero-width
/// interval at that value.
pub fn summarize(values: &[Option<f64>]) -> SummaryStatistics {
    let included: Vec<f64> = values.iter().flatten().copied().collect();
    let n_na = values.len() - included.len();
    let n = included.len();

    match n {
        0 => SummaryStatistics::empty(n_na),
        1 => {
            let mean = included[0];
            SummaryStatistics {
                mean: Some(mean),
                std: Some(0.0),
                ci95_low: Some(mean),
                ci95_high: Some(mean),
                n_included: 1,
                n_na,
            }
        }
        _ => {
            let mean = included.iter().mean();
            let std = included.iter().std_dev();
            let half_width = Z_95 * std / (n as f64).sqrt();
            debug!(target: "ocrb::stats", n, n_na, mean, std, "summary computed");
            SummaryStatistics {
                mean: Some(mean),
                std: Some(std),
                ci95_low: Some((mean - half_width).clamp(0.0, 1.0)),
                ci95_high: Some((mean + half_width).clamp(0.0, 1.0)),
                n_included: n,
                n_na,
            }
        }
    }
}

/// Per-proxy summaries over a campaign of scored runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub gds: SummaryStatistics,
    pub arr: SummaryStatistics,
    pub ist: SummaryStatistics,
    pub rec: SummaryStatistics,
    pub cfr: SummaryStatistics,
    pub ori: SummaryStatistics,
}

impl AggregateSummary {
    pub fn from_runs(runs: &[ProxyScores]) -> Self {
        let column = |pick: fn(&ProxyScores) -> Option<f64>| {
            summarize(&runs.iter().map(pick).collect::<Vec<_>>())
        };
        Self {
            gds: column(|run| run.gds),
            arr: column(|run| run.arr),
            ist: column(|run| run.ist),
            rec: column(|run| run.rec),
            cfr: column(|run| run.cfr),
            ori: column(|run| run.ori),
        }
    }

    /// Number of runs the summary was built from.
    pub fn runs(&self) -> usize {
        self.ori.n_included + self.ori.n_na
    }
}
