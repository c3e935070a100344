//! ---
//! ocrb_section: "06-statistics"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Cross-run statistical summaries of proxy values."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Statistical reduction of repeated runs.
//!
//! N/A values are excluded from every statistic but always counted, so a
//! summary discloses how much of the campaign it actually describes.

pub mod summary;

pub use summary::{summarize, AggregateSummary, SummaryStatistics, Z_95};
