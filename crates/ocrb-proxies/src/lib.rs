//! ---
//! ocrb_section: "05-proxy-metrics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Behavioural proxy calculators and aggregate scoring."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Behavioural proxy calculators.
//!
//! Each calculator is a pure function over an event slice and declared
//! parameters. Results disclose the evidence they were computed from, and a
//! proxy that cannot be justified by that evidence is reported as
//! [`ProxyOutcome::NotApplicable`] with a reason, never as zero.

pub mod arr;
pub mod cfr;
pub mod gds;
pub mod ist;
pub mod ori;
pub mod outcome;
pub mod rec;
pub mod set;

pub use arr::{compute_arr, ArrResult};
pub use cfr::{compute_cfr, CfrResult};
pub use gds::{compute_gds, GdsResult};
pub use ist::{compute_ist, IsolationTermination, IstResult};
pub use ori::{compute_ori, OriResult, ProxyValues};
pub use outcome::ProxyOutcome;
pub use rec::{compute_rec, RecResult, WorkTotals};
pub use set::{ProxyError, ProxyScores, ProxySet, Result};
