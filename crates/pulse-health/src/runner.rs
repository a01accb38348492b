//! Batched, concurrent execution of an endpoint catalog.
//!
//! The catalog is split into consecutive batches. Every request of a batch
//! runs concurrently on its own task; the next batch starts only once all
//! of them have settled. Results live in a vector at index parity with the
//! catalog, written only by the runner. Observers get owned snapshots.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use pulse_core::{EndpointDescriptor, EndpointTestResult, HttpMethod, TestProgress, TestStatus};

use crate::cancel::CancelToken;
use crate::classifier::classify;
use crate::client::{ProbeClient, ProbeResponse};
use crate::error::{ProbeError, RunError, RunResult};
use crate::progress::aggregate;

pub use pulse_core::DEFAULT_BATCH_SIZE;

/// Message recorded when a request task dies without producing an outcome.
const REQUEST_FAILED: &str = "Request failed";

/// Receives a snapshot of every result after each state change.
pub type ResultsCallback = Arc<dyn Fn(Vec<EndpointTestResult>) + Send + Sync>;

/// Receives recomputed progress after each state change.
pub type ProgressCallback = Arc<dyn Fn(TestProgress) + Send + Sync>;

/// Observers notified as a run progresses.
#[derive(Clone, Default)]
pub struct RunCallbacks {
    pub on_results: Option<ResultsCallback>,
    pub on_progress: Option<ProgressCallback>,
}

impl RunCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_results(mut self, callback: impl Fn(Vec<EndpointTestResult>) + Send + Sync + 'static) -> Self {
        self.on_results = Some(Arc::new(callback));
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(TestProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    fn emit(&self, results: &[EndpointTestResult]) {
        if let Some(cb) = &self.on_results {
            cb(results.to_vec());
        }
        if let Some(cb) = &self.on_progress {
            cb(aggregate(results));
        }
    }
}

/// A validated catalog ready to be probed.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    catalog: Arc<[EndpointDescriptor]>,
    batch_size: usize,
}

impl BatchRunner {
    /// Validate run preconditions. Fails before any network activity.
    pub fn new(catalog: Vec<EndpointDescriptor>, batch_size: usize) -> RunResult<Self> {
        if catalog.is_empty() {
            return Err(RunError::EmptyCatalog);
        }
        if batch_size == 0 {
            return Err(RunError::InvalidBatchSize(batch_size));
        }
        Ok(Self {
            catalog: catalog.into(),
            batch_size,
        })
    }

    pub fn catalog(&self) -> &[EndpointDescriptor] {
        &self.catalog
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Probe the whole catalog, batch by batch.
    ///
    /// Cancellation is checked before each batch; a cancelled run returns
    /// the results accumulated so far, with unrun entries still `Pending`.
    pub async fn run(
        &self,
        client: Arc<dyn ProbeClient>,
        cancel: &CancelToken,
        callbacks: &RunCallbacks,
    ) -> Vec<EndpointTestResult> {
        let mut results: Vec<EndpointTestResult> =
            self.catalog.iter().map(EndpointTestResult::pending).collect();
        callbacks.emit(&results);

        let batches = self.catalog.len().div_ceil(self.batch_size);
        info!(
            endpoints = self.catalog.len(),
            batch_size = self.batch_size,
            batches,
            "endpoint run starting"
        );

        for (batch, start) in (0..self.catalog.len()).step_by(self.batch_size).enumerate() {
            if cancel.is_cancelled() {
                warn!(batch, "run cancelled, stopping before next batch");
                break;
            }

            let end = (start + self.batch_size).min(self.catalog.len());
            debug!(batch, start, end, "batch starting");
            self.run_batch(start..end, &client, cancel, callbacks, &mut results)
                .await;
            callbacks.emit(&results);
        }

        let progress = aggregate(&results);
        info!(
            completed = progress.completed,
            success = progress.success,
            error = progress.error,
            pending = progress.pending,
            "endpoint run finished"
        );
        results
    }

    async fn run_batch(
        &self,
        range: std::ops::Range<usize>,
        client: &Arc<dyn ProbeClient>,
        cancel: &CancelToken,
        callbacks: &RunCallbacks,
        results: &mut [EndpointTestResult],
    ) {
        let mut tasks = JoinSet::new();
        let mut slots = HashMap::new();

        for index in range {
            let descriptor = self.catalog[index].clone();
            let client = Arc::clone(client);
            let cancel = cancel.clone();
            let handle = tasks.spawn(async move {
                let outcome = probe(client.as_ref(), &descriptor, &cancel).await;
                (index, outcome)
            });
            slots.insert(handle.id(), index);
        }

        // Wait for every request; a failed one never short-circuits the rest.
        while let Some(joined) = tasks.join_next().await {
            let updated = match joined {
                Ok((index, outcome)) => record(&mut results[index], &self.catalog[index], &outcome),
                Err(e) => match slots.get(&e.id()) {
                    Some(&index) => {
                        warn!(endpoint = %self.catalog[index].path, error = %e, "request task failed");
                        results[index].resolve(TestStatus::Error, REQUEST_FAILED, None)
                    }
                    None => false,
                },
            };
            if updated {
                callbacks.emit(results);
            }
        }
    }
}

/// Issue the method-appropriate request for one descriptor.
async fn probe(
    client: &dyn ProbeClient,
    descriptor: &EndpointDescriptor,
    cancel: &CancelToken,
) -> Result<ProbeResponse, ProbeError> {
    let start = Instant::now();
    let outcome = match descriptor.method {
        HttpMethod::Get => {
            let (path, query) = descriptor.query();
            client.get(path, &query, cancel).await
        }
        HttpMethod::Post => {
            client
                .post(&descriptor.path, &descriptor.payload.body(), cancel)
                .await
        }
    };
    debug!(
        endpoint = %descriptor.path,
        method = %descriptor.method,
        wall_ms = start.elapsed().as_millis() as u64,
        ok = outcome.is_ok(),
        "probe settled"
    );
    outcome
}

/// Write a classified outcome into its slot. Returns whether the slot changed.
fn record(
    slot: &mut EndpointTestResult,
    descriptor: &EndpointDescriptor,
    outcome: &Result<ProbeResponse, ProbeError>,
) -> bool {
    let Some(classification) = classify(outcome, descriptor.requires_auth) else {
        debug!(endpoint = %descriptor.path, "probe cancelled, leaving pending");
        return false;
    };
    if classification.status == TestStatus::Error {
        debug!(endpoint = %descriptor.path, message = %classification.message, "endpoint failed");
    }
    slot.resolve(
        classification.status,
        classification.message,
        Some(classification.elapsed_ms),
    )
}
