//! ---
//! ocrb_section: "03-persistence-logging"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Structured logging adapters and sinks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Run-scoped logging context shared by the workload and scoring crates.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for development and tests.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Run identifier associated with the log event.
    pub run_id: Option<&'a str>,
    /// Workload identifier associated with the log event.
    pub workload_id: Option<&'a str>,
    /// Pipeline stage being executed, when applicable.
    pub stage: Option<u32>,
    /// Restart count at the time of the event.
    pub restart: Option<u32>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a run identifier.
    pub fn with_run(mut self, run_id: &'a str) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Attach a workload identifier.
    pub fn with_workload(mut self, workload_id: &'a str) -> Self {
        self.workload_id = Some(workload_id);
        self
    }

    /// Attach a stage index.
    pub fn with_stage(mut self, stage: u32) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attach the current restart count.
    pub fn with_restart(mut self, restart: u32) -> Self {
        self.restart = Some(restart);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation failed or was aborted.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized lifecycle event with a success/fault outcome.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let default_ctx = LogContext::default();
    let ctx = context.unwrap_or(&default_ctx);
    match outcome {
        SystemEventOutcome::Success => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %message
        ),
        SystemEventOutcome::Fault => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new().with_run("run-01").with_stage(7);
        ocrb_info!(context = ctx.clone(), "stage completed");
        ocrb_debug!("debug message");
        ocrb_warn!(context = ctx.clone().with_restart(1), "simulated crash");
        ocrb_error!(context = ctx, "restart budget exhausted after {} restarts", 10);
    }

    #[test]
    fn init_does_not_panic() {
        init();
        init();
    }

    #[test]
    fn system_event_helper_emits() {
        init();
        let ctx = LogContext::new().with_workload("W2-A");
        log_system_event(
            Some(&ctx),
            "pipeline.completed",
            "pipeline completed all stages",
            SystemEventOutcome::Success,
        );
        log_system_event(
            None,
            "pipeline.failed",
            "pipeline terminated",
            SystemEventOutcome::Fault,
        );
    }
}
