//! ---
//! ocrb_section: "01-core-functionality"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Shared primitives and utilities for the benchmark core."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Core shared primitives for the OCRB workspace.
//! This crate exposes benchmark configuration loading, the declared
//! parameters consumed by the proxy calculators, ORI weighting, and
//! tracing initialisation used across the workspace.

pub mod config;
pub mod logging;
pub mod scoring;

pub use config::{
    BenchmarkConfig, DeclaredParameters, LoadedBenchmarkConfig, LoggingConfig, PipelineConfig,
    ScoringConfig,
};
pub use logging::{campaign_log_path, init_tracing, CampaignLog, LogFormat};
pub use scoring::{OriWeights, ProxyKind};
