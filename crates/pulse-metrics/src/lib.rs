//! pulse-metrics — health scoring for pulse runs.
//!
//! Folds endpoint results, component results and connectivity surveys into
//! one weighted score.
//!
//! ```text
//! health_score = connection × 0.5 + performance × 0.3 + security × 0.2
//!
//! connection   ← frontend survey (connected/partial) + backend registrations
//! performance  ← mean latency of successful endpoint probes, banded
//! security     ← pass rate of auth-related endpoint probes
//! ```
//!
//! Every rate is clamped to 0..=100. Computation is pure and can be repeated
//! at any time with the latest snapshots.

pub mod health;

pub use health::compute_health_metrics;
