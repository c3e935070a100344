//! ---
//! ocrb_section: "07-resilience-workloads"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Stressed reference workloads and their fault hooks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use prometheus::{self, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use crate::fault::FaultCause;

/// Registry shared between the pipeline and whoever exports the metrics.
pub type SharedRegistry = Arc<Registry>;

/// Metrics published by the stateful pipeline.
#[derive(Clone)]
pub struct PipelineMetrics {
    registry: SharedRegistry,
    stages_completed_total: IntCounterVec,
    restarts_total: IntCounterVec,
    checkpoints_written_total: IntCounterVec,
    external_failures_total: IntCounterVec,
    run_duration_seconds: HistogramVec,
}

impl PipelineMetrics {
    /// Register the pipeline metric family against the provided registry.
    pub fn new(registry: SharedRegistry) -> prometheus::Result<Self> {
        let stages_completed_total = IntCounterVec::new(
            Opts::new(
                "ocrb_pipeline_stages_completed_total",
                "Stages completed by the stateful pipeline, including re-executed stages",
            ),
            &["workload_id"],
        )?;
        registry.register(Box::new(stages_completed_total.clone()))?;

        let restarts_total = IntCounterVec::new(
            Opts::new(
                "ocrb_pipeline_restarts_total",
                "Autonomous restarts from the last durable checkpoint",
            ),
            &["workload_id", "cause"],
        )?;
        registry.register(Box::new(restarts_total.clone()))?;

        let checkpoints_written_total = IntCounterVec::new(
            Opts::new(
                "ocrb_pipeline_checkpoints_written_total",
                "Checkpoints atomically persisted",
            ),
            &["workload_id"],
        )?;
        registry.register(Box::new(checkpoints_written_total.clone()))?;

        let external_failures_total = IntCounterVec::new(
            Opts::new(
                "ocrb_pipeline_external_failures_total",
                "Failed probes of the external dependency",
            ),
            &["workload_id"],
        )?;
        registry.register(Box::new(external_failures_total.clone()))?;

        let histogram_opts = HistogramOpts::new(
            "ocrb_pipeline_run_duration_seconds",
            "Wall-clock duration of a pipeline run until completion or terminal failure",
        )
        .buckets(prometheus::exponential_buckets(0.001, 2.0, 16)?);
        let run_duration_seconds = HistogramVec::new(histogram_opts, &["workload_id", "outcome"])?;
        registry.register(Box::new(run_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            stages_completed_total,
            restarts_total,
            checkpoints_written_total,
            external_failures_total,
            run_duration_seconds,
        })
    }

    /// Expose the underlying shared registry for convenience.
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn inc_stage_completed(&self, workload_id: &str) {
        self.stages_completed_total
            .with_label_values(&[workload_id])
            .inc();
    }

    pub fn inc_restart(&self, workload_id: &str, cause: &FaultCause) {
        self.restarts_total
            .with_label_values(&[workload_id, cause.label()])
            .inc();
    }

    pub fn inc_checkpoint(&self, workload_id: &str) {
        self.checkpoints_written_total
            .with_label_values(&[workload_id])
            .inc();
    }

    pub fn inc_external_failure(&self, workload_id: &str) {
        self.external_failures_total
            .with_label_values(&[workload_id])
            .inc();
    }

    /// Record the run duration under a `completed` or `failed` outcome label.
    pub fn observe_run(&self, workload_id: &str, failed: bool, duration: Duration) {
        let outcome = if failed { "failed" } else { "completed" };
        self.run_duration_seconds
            .with_label_values(&[workload_id, outcome])
            .observe(duration.as_secs_f64());
    }
}

impl std::fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineMetrics").finish_non_exhaustive()
    }
}
