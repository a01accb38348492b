//! Human-readable run reports.

use std::collections::BTreeMap;

use serde::Serialize;

use pulse_core::{EndpointTestResult, HealthMetrics, TestProgress, TestStatus};

/// Everything a finished (or cancelled) run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub target: String,
    pub cancelled: bool,
    pub progress: TestProgress,
    pub metrics: HealthMetrics,
    pub results: Vec<EndpointTestResult>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.progress.error > 0
    }

    /// Results grouped by category, in first-seen order within each group.
    fn by_category(&self) -> BTreeMap<&str, Vec<&EndpointTestResult>> {
        let mut groups: BTreeMap<&str, Vec<&EndpointTestResult>> = BTreeMap::new();
        for r in &self.results {
            groups.entry(r.category.as_str()).or_default().push(r);
        }
        groups
    }
}

pub fn format_text(report: &RunReport) -> String {
    let mut out = String::new();
    let p = &report.progress;
    let m = &report.metrics;

    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str("║  Endpoint Health Report                  ║\n");
    out.push_str("╠══════════════════════════════════════════╣\n");
    out.push_str(&format!("║  Target:   {:<30}║\n", truncate(&report.target, 30)));
    out.push_str(&format!("║  Score:    {:<30}║\n", format!("{}/100", m.health_score)));
    out.push_str(&format!("║  Progress: {:<30}║\n", format!("{}/{} ({}%)", p.completed, p.total, p.percentage)));
    out.push_str("╚══════════════════════════════════════════╝\n\n");

    if report.cancelled {
        out.push_str("⚠️  Run cancelled, results are partial.\n\n");
    }

    out.push_str(&format!("Endpoints ({} total):\n", p.total));
    out.push_str(&format!("  ✅ {} reachable\n", p.success));
    out.push_str(&format!("  ❌ {} failing\n", p.error));
    out.push_str(&format!("  ⏳ {} not run\n\n", p.pending));

    out.push_str("Rates:\n");
    out.push_str(&format!("  Connection:  {:>3}%\n", m.connection_rate));
    out.push_str(&format!("  Performance: {:>3}%\n", m.performance_rate));
    out.push_str(&format!("  Security:    {:>3}%\n\n", m.security_rate));

    for (category, results) in report.by_category() {
        out.push_str(&format!("{category}:\n"));
        for r in results {
            out.push_str(&format!(
                "  {} {:<4} {:<40} {}\n",
                r.status.symbol(),
                r.method,
                r.endpoint,
                r.message.as_deref().unwrap_or("-"),
            ));
        }
        out.push('\n');
    }

    out
}

pub fn format_markdown(report: &RunReport) -> String {
    let mut out = String::new();
    let p = &report.progress;
    let m = &report.metrics;

    out.push_str("# Endpoint Health Report\n\n");
    out.push_str(&format!("- **Target:** `{}`\n", report.target));
    out.push_str(&format!("- **Health score:** {}/100\n", m.health_score));
    out.push_str(&format!(
        "- **Progress:** {}/{} ({}%)\n",
        p.completed, p.total, p.percentage
    ));
    if report.cancelled {
        out.push_str("- **Note:** run cancelled, results are partial\n");
    }
    out.push('\n');

    out.push_str("| Rate | Value |\n|---|---|\n");
    out.push_str(&format!("| Connection | {}% |\n", m.connection_rate));
    out.push_str(&format!("| Performance | {}% |\n", m.performance_rate));
    out.push_str(&format!("| Security | {}% |\n\n", m.security_rate));

    for (category, results) in report.by_category() {
        out.push_str(&format!("## {category}\n\n"));
        out.push_str("| Status | Method | Endpoint | Result |\n|---|---|---|---|\n");
        for r in results {
            out.push_str(&format!(
                "| {} | {} | `{}` | {} |\n",
                status_label(r.status),
                r.method,
                r.endpoint,
                r.message.as_deref().unwrap_or("-"),
            ));
        }
        out.push('\n');
    }

    out
}

fn status_label(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pending => "⏳ pending",
        TestStatus::Success => "✅ ok",
        TestStatus::Error => "❌ error",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}…")
    }
}
