//! ---
//! ocrb_section: "01-core-functionality"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Shared primitives and utilities for the benchmark core."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::logging::LogFormat;
use crate::scoring::OriWeights;

fn default_stages() -> u32 {
    50
}

fn default_checkpoint_every() -> u32 {
    5
}

fn default_max_restarts() -> u32 {
    10
}

fn default_external_required_every() -> u32 {
    1
}

fn default_external_grace_failures() -> u32 {
    10
}

fn default_stage_work() -> Duration {
    Duration::from_millis(5)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Top-level configuration for a benchmark campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub declared: DeclaredParameters,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where a [`BenchmarkConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedBenchmarkConfig {
    pub config: BenchmarkConfig,
    pub source: PathBuf,
}

impl BenchmarkConfig {
    pub const ENV_CONFIG_PATH: &'static str = "OCRB_CONFIG";

    /// Load configuration from disk, respecting the `OCRB_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedBenchmarkConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedBenchmarkConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedBenchmarkConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Read and validate a single configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading benchmark configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<BenchmarkConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.declared.validate()?;
        self.scoring.weights.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for BenchmarkConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: BenchmarkConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Parameters declared ahead of a run and consumed by the proxy calculators.
///
/// Every field is optional: an undeclared parameter makes the dependent proxy
/// report N/A rather than guessing a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredParameters {
    /// Ordered stress intensity levels expected to carry completion evidence (GDS).
    #[serde(default)]
    pub stress_levels: Option<Vec<f64>>,
    /// Declared isolation window length in seconds (IST).
    #[serde(default)]
    pub isolation_duration_s: Option<f64>,
    /// Total number of components in the workload topology (CFR).
    #[serde(default)]
    pub component_total: Option<u64>,
    /// Minimum summed baseline work for the baseline run to be usable (REC).
    #[serde(default)]
    pub baseline_min_work: f64,
}

impl DeclaredParameters {
    pub fn validate(&self) -> Result<()> {
        if let Some(levels) = &self.stress_levels {
            if let Some(bad) = levels.iter().find(|level| !level.is_finite()) {
                return Err(anyhow!("declared stress level must be numeric, got {}", bad));
            }
        }
        if let Some(duration) = self.isolation_duration_s {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(anyhow!(
                    "declared isolation duration must be positive, got {}",
                    duration
                ));
            }
        }
        if !self.baseline_min_work.is_finite() {
            return Err(anyhow!("baseline_min_work must be finite"));
        }
        Ok(())
    }
}

/// Aggregate scoring settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: OriWeights,
}

/// Tuning for the stateful reference pipeline.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of ordered stages executed per run.
    #[serde(default = "default_stages")]
    pub stages: u32,
    /// Persist the next-stage index after every `checkpoint_every` completed stages.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: u32,
    /// Restart budget before a recoverable failure becomes terminal.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    /// Stages whose index is a multiple of this value call the external dependency.
    #[serde(default = "default_external_required_every")]
    pub external_required_every: u32,
    /// Consecutive external failures tolerated before the dependency is declared unavailable.
    #[serde(default = "default_external_grace_failures")]
    pub external_grace_failures: u32,
    /// Simulated work performed by each stage.
    #[serde(default = "default_stage_work", rename = "stage_work_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub stage_work: Duration,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stages == 0 {
            return Err(anyhow!("pipeline must declare at least one stage"));
        }
        if self.checkpoint_every == 0 {
            return Err(anyhow!("pipeline checkpoint_every must be at least 1"));
        }
        if self.external_required_every == 0 {
            return Err(anyhow!("pipeline external_required_every must be at least 1"));
        }
        Ok(())
    }

    /// Builder-style override for the per-stage work delay.
    pub fn with_stage_work(mut self, stage_work: Duration) -> Self {
        self.stage_work = stage_work;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
            checkpoint_every: default_checkpoint_every(),
            max_restarts: default_max_restarts(),
            external_required_every: default_external_required_every(),
            external_grace_failures: default_external_grace_failures(),
            stage_work: default_stage_work(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}
