//! ---
//! ocrb_section: "07-resilience-workloads"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Stressed reference workloads and their fault hooks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Reference workloads that generate resilience evidence.
//!
//! The [`StatefulPipeline`] runs a fixed number of ordered stages, persists
//! its progress through a checkpoint, and restarts itself from that
//! checkpoint when an injected crash or an unavailable external dependency
//! interrupts it. Fault injection is supplied by the caller through the
//! [`CrashPredicate`] and [`ExternalDependency`] capabilities.

pub mod crash;
pub mod dependency;
pub mod fault;
pub mod metrics;
pub mod pipeline;

pub use crash::{
    CrashAtStages, CrashOnce, CrashPredicate, ModuloCrashSchedule, NoCrashes, SeededCrashSchedule,
};
pub use dependency::{
    AlwaysAvailable, DependencyFailure, ExternalDependency, IsolationSwitch, ScriptedDependency,
};
pub use fault::{FaultCause, FaultRecord, PipelineFault, Recoverability};
pub use metrics::{PipelineMetrics, SharedRegistry};
pub use pipeline::{PipelineError, PipelineRunResult, Result, StatefulPipeline};
