//! Weighted health score over endpoint, component, and connectivity checks.

use pulse_core::{
    BackendCheck, ComponentTestResult, ConnectionStatus, EndpointTestResult, FrontendCheck,
    HealthMetrics, TestStatus,
};
use tracing::debug;

/// Connection rate used when neither side reports data.
const DEFAULT_CONNECTION_RATE: f64 = 50.0;

const CONNECTION_WEIGHT: f64 = 0.5;
const PERFORMANCE_WEIGHT: f64 = 0.3;
const SECURITY_WEIGHT: f64 = 0.2;

/// Mean-latency bands: (upper bound exclusive in ms, rate).
const PERFORMANCE_BANDS: [(f64, f64); 4] = [(200.0, 100.0), (500.0, 90.0), (1000.0, 75.0), (2000.0, 50.0)];
const SLOWEST_BAND_RATE: f64 = 25.0;

/// Combine the latest snapshots into a health summary.
///
/// `connection_status` is the live view; `frontend_check` and
/// `backend_check` are fallbacks used when the live view has no data for
/// that side.
pub fn compute_health_metrics(
    connection_status: Option<&ConnectionStatus>,
    frontend_check: Option<&FrontendCheck>,
    backend_check: Option<&BackendCheck>,
    endpoint_results: &[EndpointTestResult],
    component_results: &[ComponentTestResult],
) -> HealthMetrics {
    // Score is weighted over the reported rates, not the raw ones.
    let connection = clamp_rate(connection_rate(connection_status, frontend_check, backend_check));
    let performance = clamp_rate(performance_rate(endpoint_results));
    let security = clamp_rate(security_rate(endpoint_results));
    let score = weighted_score(connection, performance, security);

    let statuses = endpoint_results
        .iter()
        .map(|r| r.status)
        .chain(component_results.iter().map(|c| c.status));
    let (mut active, mut partial, mut failed) = (0, 0, 0);
    for status in statuses {
        match status {
            TestStatus::Success => active += 1,
            TestStatus::Pending => partial += 1,
            TestStatus::Error => failed += 1,
        }
    }

    debug!(connection, performance, security, score, "health metrics computed");

    HealthMetrics {
        health_score: score,
        connection_rate: connection,
        performance_rate: performance,
        security_rate: security,
        total_features: endpoint_results.len() + component_results.len(),
        active_features: active,
        partial_features: partial,
        inactive_features: failed,
        error_features: failed,
    }
}

fn connection_rate(
    live: Option<&ConnectionStatus>,
    frontend_check: Option<&FrontendCheck>,
    backend_check: Option<&BackendCheck>,
) -> f64 {
    let frontend = live
        .and_then(|s| s.frontend.as_ref())
        .and_then(frontend_score)
        .or_else(|| frontend_check.and_then(frontend_score));
    let backend = live
        .and_then(|s| s.backend.as_ref())
        .and_then(backend_score)
        .or_else(|| backend_check.and_then(backend_score));

    match (frontend, backend) {
        (Some(f), Some(b)) => (f + b) / 2.0,
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => DEFAULT_CONNECTION_RATE,
    }
}

fn frontend_score(check: &FrontendCheck) -> Option<f64> {
    if check.total == 0 {
        return None;
    }
    let weighted = check.connected as f64 * 100.0 + check.partial as f64 * 50.0;
    Some(weighted / check.total as f64)
}

fn backend_score(check: &BackendCheck) -> Option<f64> {
    let total = check.registered + check.unregistered;
    if total == 0 {
        return None;
    }
    Some(check.registered as f64 / total as f64 * 100.0)
}

fn performance_rate(results: &[EndpointTestResult]) -> f64 {
    if results.is_empty() {
        return 100.0;
    }

    let timings: Vec<u64> = results
        .iter()
        .filter(|r| r.status == TestStatus::Success)
        .filter_map(|r| r.response_time_ms)
        .collect();
    if timings.is_empty() {
        return 0.0;
    }

    let mean = timings.iter().sum::<u64>() as f64 / timings.len() as f64;
    PERFORMANCE_BANDS
        .iter()
        .find(|(limit, _)| mean < *limit)
        .map_or(SLOWEST_BAND_RATE, |(_, rate)| *rate)
}

fn security_rate(results: &[EndpointTestResult]) -> f64 {
    let (total, passed) = results
        .iter()
        .filter(|r| r.is_auth_related())
        .fold((0usize, 0usize), |(total, passed), r| {
            (total + 1, passed + usize::from(r.status == TestStatus::Success))
        });
    if total == 0 {
        return 100.0;
    }
    passed as f64 / total as f64 * 100.0
}

fn weighted_score(connection: u8, performance: u8, security: u8) -> u8 {
    clamp_rate(
        f64::from(connection) * CONNECTION_WEIGHT
            + f64::from(performance) * PERFORMANCE_WEIGHT
            + f64::from(security) * SECURITY_WEIGHT,
    )
}

fn clamp_rate(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
