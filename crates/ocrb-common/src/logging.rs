//! ---
//! ocrb_section: "01-core-functionality"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Shared primitives and utilities for the benchmark core."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Process-wide tracing for a benchmark campaign.
//!
//! A campaign logs to stdout and to a single JSON-lines evidence file named
//! after the campaign, so every run of that campaign can be audited from one
//! place.

use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "OCRB_LOG";
const DEFAULT_DIRECTIVE: &str = "info";
const DEFAULT_FILE_PREFIX: &str = "ocrb";

static CAMPAIGN_LOG: OnceCell<CampaignLog> = OnceCell::new();
static GUARDS: OnceCell<(WorkerGuard, WorkerGuard)> = OnceCell::new();

/// Available log formats for benchmark runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// The campaign whose tracing is installed in this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignLog {
    campaign_id: String,
    path: PathBuf,
}

impl CampaignLog {
    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    /// JSON-lines file receiving every event of the campaign.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<directory>/<prefix>-<campaign>.jsonl`, with the campaign id reduced to
/// file-name-safe characters.
pub fn campaign_log_path(campaign_id: &str, config: &LoggingConfig) -> PathBuf {
    let prefix = config.file_prefix.as_deref().unwrap_or(DEFAULT_FILE_PREFIX);
    let campaign: String = campaign_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    config.directory.join(format!("{prefix}-{campaign}.jsonl"))
}

/// Filter from an explicit directive, then `RUST_LOG`, then `info`.
fn resolve_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive ({err}); defaulting to {DEFAULT_DIRECTIVE}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

/// Install tracing for `campaign_id` and return where its evidence log lives.
///
/// A process hosts one campaign's subscriber: the first call installs it and
/// later calls return that same [`CampaignLog`] whatever id they pass.
/// `OCRB_LOG` overrides the filter (e.g. `ocrb::workloads=debug`).
pub fn init_tracing(campaign_id: &str, config: &LoggingConfig) -> Result<&'static CampaignLog> {
    CAMPAIGN_LOG.get_or_try_init(|| install(campaign_id, config))
}

fn install(campaign_id: &str, config: &LoggingConfig) -> Result<CampaignLog> {
    std::fs::create_dir_all(&config.directory)?;
    let path = campaign_log_path(campaign_id, config);
    let file_name = path
        .file_name()
        .map(|name| name.to_owned())
        .unwrap_or_default();

    // A campaign is bounded, so its evidence file is never rotated.
    let file_appender = rolling::never(&config.directory, file_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let _ = GUARDS.set((file_guard, stdout_guard));

    let directive = std::env::var(LOG_ENV).ok();
    let filter = resolve_filter(directive.as_deref());

    let stdout_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .json()
            .with_writer(stdout_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(stdout_writer)
            .boxed(),
    };
    let evidence_layer = fmt::layer()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json()
        .with_writer(file_writer)
        .boxed();

    // Another subscriber (a test harness, an embedding binary) may already
    // own the global slot; the campaign then logs through it.
    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(evidence_layer)
        .try_init()
        .ok();

    info!(
        target: "ocrb::campaign",
        campaign_id,
        log_file = %path.display(),
        format = ?config.format,
        "campaign tracing initialised"
    );
    Ok(CampaignLog {
        campaign_id: campaign_id.to_owned(),
        path,
    })
}
