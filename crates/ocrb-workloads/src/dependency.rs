//! ---
//! ocrb_section: "07-resilience-workloads"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Stressed reference workloads and their fault hooks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! External dependency probes used by the pipeline.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Why a probe of the external dependency failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyFailure {
    /// Transiently unreachable; tolerated up to the configured grace threshold.
    #[error("external dependency unavailable: {0}")]
    Unavailable(String),
    /// Failed in a way no restart can fix.
    #[error("external dependency failed permanently: {0}")]
    Fatal(String),
}

/// A dependency the pipeline must reach on its configured cadence.
pub trait ExternalDependency {
    fn probe(&mut self) -> Result<(), DependencyFailure>;
}

impl<F> ExternalDependency for F
where
    F: FnMut() -> Result<(), DependencyFailure>,
{
    fn probe(&mut self) -> Result<(), DependencyFailure> {
        self()
    }
}

/// Dependency that always answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl ExternalDependency for AlwaysAvailable {
    fn probe(&mut self) -> Result<(), DependencyFailure> {
        Ok(())
    }
}

/// Shared on/off switch modelling an isolation window.
///
/// Clones share the same state: the caller keeps one handle to isolate and
/// restore the dependency while the pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct IsolationSwitch {
    isolated: Arc<AtomicBool>,
}

impl IsolationSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isolate(&self) {
        self.isolated.store(true, Ordering::SeqCst);
    }

    pub fn restore(&self) {
        self.isolated.store(false, Ordering::SeqCst);
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated.load(Ordering::SeqCst)
    }
}

impl ExternalDependency for IsolationSwitch {
    fn probe(&mut self) -> Result<(), DependencyFailure> {
        if self.is_isolated() {
            return Err(DependencyFailure::Unavailable("isolated".into()));
        }
        Ok(())
    }
}

/// Replays a queue of outcomes, then falls back to a fixed answer.
#[derive(Debug, Clone)]
pub struct ScriptedDependency {
    script: VecDeque<Result<(), DependencyFailure>>,
    fallback: Result<(), DependencyFailure>,
    calls: usize,
}

impl ScriptedDependency {
    /// Outcomes are returned in order; once exhausted every probe succeeds.
    pub fn new(script: impl IntoIterator<Item = Result<(), DependencyFailure>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: Ok(()),
            calls: 0,
        }
    }

    /// Answer returned once the script is exhausted.
    pub fn then(mut self, fallback: Result<(), DependencyFailure>) -> Self {
        self.fallback = fallback;
        self
    }

    /// `failures` consecutive unavailable answers followed by success.
    pub fn unavailable_for(failures: usize) -> Self {
        Self::new((0..failures).map(|_| Err(DependencyFailure::Unavailable("scripted".into()))))
    }

    /// Number of probes answered so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl ExternalDependency for ScriptedDependency {
    fn probe(&mut self) -> Result<(), DependencyFailure> {
        self.calls += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
