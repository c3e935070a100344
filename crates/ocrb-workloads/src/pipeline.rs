//! ---
//! ocrb_section: "07-resilience-workloads"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Stressed reference workloads and their fault hooks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Checkpointed stateful pipeline.
//!
//! The run is an explicit state machine:
//!
//! ```text
//! NotStarted -> Running(k) -> Checkpointing(k+1) -> Running(k+1) -> ... -> Completed
//!                   |                                    ^
//!                   v                                    |
//!               Crashed(fault) --restart, reload checkpoint
//!                   |
//!                   v
//!                Failed
//! ```
//!
//! Recoverable faults restart the pipeline from its last durable checkpoint
//! until the restart budget is spent. Checkpoint corruption is not a fault of
//! the workload and is returned as [`PipelineError`].

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use ocrb_common::PipelineConfig;
use ocrb_logging::{
    log_system_event, ocrb_debug, ocrb_error, ocrb_warn, LogContext, SystemEventOutcome,
};
use ocrb_persistence::{CheckpointStore, PersistenceError};
use serde::Serialize;
use serde_with::{serde_as, DurationSecondsWithFrac};
use thiserror::Error;
use tracing::info;

use crate::crash::CrashPredicate;
use crate::dependency::{DependencyFailure, ExternalDependency};
use crate::fault::{FaultCause, FaultRecord, PipelineFault};
use crate::metrics::PipelineMetrics;

/// Errors that abort a pipeline run without a [`PipelineRunResult`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
    /// The checkpoint could not be read or written. Corruption lands here and
    /// is never mistaken for a cold start.
    #[error("checkpoint failure: {0}")]
    Checkpoint(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Outcome of a pipeline run that reached a terminal state.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRunResult {
    pub stages_total: u32,
    /// Highest stage count actually completed, across every attempt.
    pub stages_completed: u32,
    pub restarts: u32,
    #[serde(rename = "duration_s")]
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub duration: Duration,
    pub failed: bool,
    /// Every fault in the order it occurred.
    pub faults: Vec<FaultRecord>,
}

impl PipelineRunResult {
    /// Fraction of declared stages completed, in `[0, 1]`.
    pub fn completion_rate(&self) -> f64 {
        if self.stages_total == 0 {
            return 0.0;
        }
        f64::from(self.stages_completed) / f64::from(self.stages_total)
    }

    /// Faults the pipeline restarted past.
    pub fn recovered_faults(&self) -> impl Iterator<Item = &FaultRecord> {
        self.faults.iter().filter(|record| record.restarted)
    }

    /// The fault that ended the run, if it failed.
    pub fn terminal_fault(&self) -> Option<&FaultRecord> {
        self.faults.iter().find(|record| !record.restarted)
    }
}

/// Mutable counters of one run, owned by that run alone.
#[derive(Debug)]
struct ExecutionContext {
    seed: u64,
    started: Instant,
    restarts: u32,
    consecutive_external_failures: u32,
    highest_completed: u32,
    faults: Vec<FaultRecord>,
}

impl ExecutionContext {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            started: Instant::now(),
            restarts: 0,
            consecutive_external_failures: 0,
            highest_completed: 0,
            faults: Vec::new(),
        }
    }
}

#[derive(Debug)]
enum PipelineState {
    NotStarted,
    Running { stage: u32 },
    Checkpointing { completed: u32 },
    Crashed(PipelineFault),
    Completed,
    Failed(PipelineFault),
}

/// Multi-stage pipeline that checkpoints progress and restarts itself after recoverable faults.
pub struct StatefulPipeline<C, D> {
    config: PipelineConfig,
    store: CheckpointStore,
    crash: C,
    dependency: D,
    metrics: Option<PipelineMetrics>,
    run_id: String,
    workload_id: String,
}

impl<C, D> StatefulPipeline<C, D>
where
    C: CrashPredicate,
    D: ExternalDependency,
{
    /// Pipeline whose checkpoint lives at `run_dir/checkpoint.json`.
    pub fn new(run_dir: impl AsRef<Path>, config: PipelineConfig, crash: C, dependency: D) -> Self {
        Self {
            config,
            store: CheckpointStore::for_run_dir(run_dir),
            crash,
            dependency,
            metrics: None,
            run_id: "run".to_owned(),
            workload_id: "W2-A".to_owned(),
        }
    }

    /// Identifiers attached to every log line of the run.
    pub fn with_ids(mut self, run_id: impl Into<String>, workload_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self.workload_id = workload_id.into();
        self
    }

    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn crash_predicate(&self) -> &C {
        &self.crash
    }

    pub fn dependency(&self) -> &D {
        &self.dependency
    }

    /// Execute the pipeline until it completes or fails terminally.
    ///
    /// The checkpoint is read once at start and once per restart; an absent
    /// checkpoint is created at stage 0 before the first stage runs.
    pub fn run(&mut self, seed: u64) -> Result<PipelineRunResult> {
        self.config
            .validate()
            .map_err(|err| PipelineError::InvalidConfig(err.to_string()))?;

        let mut ctx = ExecutionContext::new(seed);
        let mut state = PipelineState::NotStarted;
        loop {
            state = match state {
                PipelineState::NotStarted => PipelineState::Running {
                    stage: self.resume_point()?,
                },
                PipelineState::Running { stage } if stage >= self.config.stages => {
                    self.store.save(self.config.stages)?;
                    self.record_checkpoint();
                    PipelineState::Completed
                }
                PipelineState::Running { stage } => match self.execute_stage(stage, &mut ctx) {
                    Ok(()) => {
                        let completed = stage + 1;
                        ctx.highest_completed = ctx.highest_completed.max(completed);
                        if completed % self.config.checkpoint_every == 0 {
                            PipelineState::Checkpointing { completed }
                        } else {
                            PipelineState::Running { stage: completed }
                        }
                    }
                    Err(fault) => PipelineState::Crashed(fault),
                },
                PipelineState::Checkpointing { completed } => {
                    self.store.save(completed)?;
                    self.record_checkpoint();
                    PipelineState::Running { stage: completed }
                }
                PipelineState::Crashed(fault) => self.recover(fault, &mut ctx)?,
                PipelineState::Completed => return Ok(self.finish(ctx, false)),
                PipelineState::Failed(fault) => {
                    ctx.faults.push(FaultRecord {
                        fault,
                        restarted: false,
                        resumed_at: None,
                    });
                    return Ok(self.finish(ctx, true));
                }
            };
        }
    }

    fn log_context(&self) -> LogContext<'_> {
        LogContext::new()
            .with_run(&self.run_id)
            .with_workload(&self.workload_id)
    }

    fn resume_point(&self) -> Result<u32> {
        let next_stage = match self.store.load()? {
            Some(checkpoint) => checkpoint.next_stage,
            None => {
                self.store.save(0)?;
                0
            }
        };
        info!(
            target: "ocrb::workloads::pipeline",
            run_id = %self.run_id,
            stages = self.config.stages,
            next_stage,
            checkpoint = %self.store.path().display(),
            "pipeline starting"
        );
        Ok(next_stage)
    }

    /// Run one stage. No progress is credited when a fault is returned.
    fn execute_stage(
        &mut self,
        stage: u32,
        ctx: &mut ExecutionContext,
    ) -> std::result::Result<(), PipelineFault> {
        if self.crash.should_crash(ctx.seed, stage) {
            return Err(PipelineFault::new(stage, FaultCause::SimulatedCrash));
        }

        if stage % self.config.external_required_every == 0 {
            match self.dependency.probe() {
                Ok(()) => ctx.consecutive_external_failures = 0,
                Err(DependencyFailure::Unavailable(reason)) => {
                    ctx.consecutive_external_failures += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.inc_external_failure(&self.workload_id);
                    }
                    ocrb_debug!(
                        context = self.log_context().with_stage(stage),
                        "external dependency unavailable ({}), {} consecutive",
                        reason,
                        ctx.consecutive_external_failures
                    );
                    if ctx.consecutive_external_failures > self.config.external_grace_failures {
                        return Err(PipelineFault::new(
                            stage,
                            FaultCause::ExternalUnavailable {
                                consecutive_failures: ctx.consecutive_external_failures,
                            },
                        ));
                    }
                }
                Err(DependencyFailure::Fatal(detail)) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.inc_external_failure(&self.workload_id);
                    }
                    return Err(PipelineFault::new(stage, FaultCause::ExternalFatal { detail }));
                }
            }
        }

        if !self.config.stage_work.is_zero() {
            thread::sleep(self.config.stage_work);
        }
        if let Some(metrics) = &self.metrics {
            metrics.inc_stage_completed(&self.workload_id);
        }
        Ok(())
    }

    fn recover(
        &mut self,
        fault: PipelineFault,
        ctx: &mut ExecutionContext,
    ) -> Result<PipelineState> {
        if !fault.is_recoverable() || ctx.restarts >= self.config.max_restarts {
            return Ok(PipelineState::Failed(fault));
        }

        ctx.restarts += 1;
        let resumed_at = self.store.load_next_stage()?;
        ocrb_warn!(
            context = self.log_context().with_stage(fault.stage).with_restart(ctx.restarts),
            "{}; restarting from checkpoint stage {}",
            fault,
            resumed_at
        );
        if let Some(metrics) = &self.metrics {
            metrics.inc_restart(&self.workload_id, &fault.cause);
        }
        ctx.faults.push(FaultRecord {
            fault,
            restarted: true,
            resumed_at: Some(resumed_at),
        });
        Ok(PipelineState::Running { stage: resumed_at })
    }

    fn record_checkpoint(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_checkpoint(&self.workload_id);
        }
    }

    fn finish(&self, ctx: ExecutionContext, failed: bool) -> PipelineRunResult {
        let duration = ctx.started.elapsed();
        let stages_completed = if failed {
            ctx.highest_completed
        } else {
            self.config.stages
        };
        let result = PipelineRunResult {
            stages_total: self.config.stages,
            stages_completed,
            restarts: ctx.restarts,
            duration,
            failed,
            faults: ctx.faults,
        };

        if let Some(metrics) = &self.metrics {
            metrics.observe_run(&self.workload_id, failed, duration);
        }
        let log_ctx = self.log_context().with_restart(result.restarts);
        if failed {
            ocrb_error!(
                context = log_ctx.clone().with_stage(stages_completed),
                "pipeline failed after {} restarts with {}/{} stages completed",
                result.restarts,
                stages_completed,
                result.stages_total
            );
            log_system_event(
                Some(&log_ctx),
                "pipeline.failed",
                "pipeline terminated before completing all stages",
                SystemEventOutcome::Fault,
            );
        } else {
            log_system_event(
                Some(&log_ctx),
                "pipeline.completed",
                "pipeline completed all stages",
                SystemEventOutcome::Success,
            );
        }
        result
    }
}

impl<C, D> std::fmt::Debug for StatefulPipeline<C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulPipeline")
            .field("config", &self.config)
            .field("checkpoint", &self.store.path())
            .field("run_id", &self.run_id)
            .field("workload_id", &self.workload_id)
            .finish_non_exhaustive()
    }
}
