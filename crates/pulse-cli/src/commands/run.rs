use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use pulse_core::{BackendCheck, FrontendCheck, PulseConfig, TestProgress};
use pulse_health::{HealthRunner, HyperProbeClient, RunCallbacks, aggregate};
use pulse_metrics::compute_health_metrics;

use crate::OutputFormat;
use crate::report::{self, RunReport};

const DEFAULT_CONFIG_FILE: &str = "pulse.toml";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub base_url: Option<String>,
    pub batch_size: Option<usize>,
    pub format: OutputFormat,
    pub frontend_check: Option<PathBuf>,
    pub backend_check: Option<PathBuf>,
}

/// Probe the catalog and print a report. Returns whether every endpoint
/// that ran was healthy.
pub async fn run(opts: RunOptions) -> anyhow::Result<bool> {
    let mut config = load_config(opts.config.as_deref(), opts.base_url.as_deref())?;
    if let Some(batch_size) = opts.batch_size {
        config.set_batch_size(batch_size);
    }
    config.validate()?;

    let frontend: Option<FrontendCheck> = opts
        .frontend_check
        .as_deref()
        .map(read_json)
        .transpose()?;
    let backend: Option<BackendCheck> = opts
        .backend_check
        .as_deref()
        .map(read_json)
        .transpose()?;

    let client = HyperProbeClient::new(&config.target.base_url, config.timeout()?);
    let runner = HealthRunner::new(Arc::new(client))
        .with_catalog(config.catalog())
        .with_batch_size(config.batch_size())
        .with_callbacks(RunCallbacks::new().on_progress(print_progress));

    let handle = runner.start_run(None)?;
    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            cancel.cancel();
        }
    });

    let cancelled = handle.cancel_token();
    let results = handle.wait().await?;
    eprintln!();

    let progress = aggregate(&results);
    let metrics = compute_health_metrics(None, frontend.as_ref(), backend.as_ref(), &results, &[]);
    info!(
        score = metrics.health_score,
        success = progress.success,
        error = progress.error,
        "run complete"
    );

    let report = RunReport {
        target: config.target.base_url.clone(),
        cancelled: cancelled.is_cancelled(),
        progress,
        metrics,
        results,
    };

    match opts.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Markdown => print!("{}", report::format_markdown(&report)),
        OutputFormat::Text => print!("{}", report::format_text(&report)),
    }

    Ok(!report.has_failures())
}

/// Explicit `--config`, else `./pulse.toml` if present, else defaults.
/// `--base-url` overrides whatever the file says.
fn load_config(path: Option<&Path>, base_url: Option<&str>) -> anyhow::Result<PulseConfig> {
    let mut config = match path {
        Some(p) => PulseConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            PulseConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("failed to load {DEFAULT_CONFIG_FILE}"))?
        }
        None => PulseConfig::new(DEFAULT_BASE_URL),
    };

    if let Some(url) = base_url {
        config.target.base_url = url.to_string();
    }
    Ok(config)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_progress(p: TestProgress) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(
        stderr,
        "\r[{:>3}%] {}/{}  ✅ {}  ❌ {}",
        p.percentage, p.completed, p.total, p.success, p.error
    );
    let _ = stderr.flush();
}
