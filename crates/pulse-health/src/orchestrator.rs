//! Run orchestration: one current run at a time.
//!
//! At most one run is current. Starting a new run cancels the previous one
//! and bumps the run generation; callbacks still arriving from a superseded
//! run are dropped instead of reaching the observers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use pulse_core::{EndpointDescriptor, EndpointTestResult, default_catalog};

use crate::cancel::CancelToken;
use crate::client::ProbeClient;
use crate::error::{RunError, RunResult};
use crate::runner::{BatchRunner, DEFAULT_BATCH_SIZE, RunCallbacks};

/// Handle to a spawned run.
pub struct RunHandle {
    generation: u64,
    cancel: CancelToken,
    handle: JoinHandle<Vec<EndpointTestResult>>,
}

impl RunHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the run at the next batch boundary and abandon in-flight requests.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A clone of the run's token, for cancelling from another task.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to stop and return its final results.
    ///
    /// A cancelled run still returns its partial results.
    pub async fn wait(self) -> RunResult<Vec<EndpointTestResult>> {
        self.handle.await.map_err(|e| RunError::Join(e.to_string()))
    }
}

/// Drives endpoint runs against one probe client.
pub struct HealthRunner {
    client: Arc<dyn ProbeClient>,
    catalog: Vec<EndpointDescriptor>,
    batch_size: usize,
    callbacks: RunCallbacks,
    /// Generation of the current run; 0 before the first run. Observers
    /// are invoked with this lock held, so a bump can never interleave
    /// with a delivery.
    generation: Arc<Mutex<u64>>,
    /// Cancel token of the current run. Locked before `generation`.
    current: Mutex<Option<CancelToken>>,
}

impl HealthRunner {
    /// Create a runner over the built-in catalog with the default batch size.
    pub fn new(client: Arc<dyn ProbeClient>) -> Self {
        Self {
            client,
            catalog: default_catalog(),
            batch_size: DEFAULT_BATCH_SIZE,
            callbacks: RunCallbacks::default(),
            generation: Arc::new(Mutex::new(0)),
            current: Mutex::new(None),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<EndpointDescriptor>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_callbacks(mut self, callbacks: RunCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn current_generation(&self) -> u64 {
        *lock(&self.generation)
    }

    /// Start a run over `catalog_override`, or the configured catalog.
    ///
    /// Preconditions are checked before anything is spawned. Any previous
    /// run is cancelled. Must be called within a tokio runtime, and never
    /// from inside one of the run callbacks.
    pub fn start_run(
        &self,
        catalog_override: Option<Vec<EndpointDescriptor>>,
    ) -> RunResult<RunHandle> {
        let catalog = catalog_override.unwrap_or_else(|| self.catalog.clone());
        let runner = BatchRunner::new(catalog, self.batch_size)?;
        let cancel = CancelToken::new();

        let generation = {
            let mut current = lock(&self.current);
            if let Some(previous) = current.replace(cancel.clone()) {
                previous.cancel();
            }
            let mut generation = lock(&self.generation);
            *generation += 1;
            *generation
        };

        let callbacks = self.guarded_callbacks(generation);
        let client = Arc::clone(&self.client);
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            runner.run(client, &task_cancel, &callbacks).await
        });

        info!(generation, "endpoint run started");
        Ok(RunHandle {
            generation,
            cancel,
            handle,
        })
    }

    /// Cancel the current run, if any.
    ///
    /// Not callable from a run callback; observers cancel through the run's
    /// [`CancelToken`] (see [`RunHandle::cancel_token`]) instead.
    pub fn cancel(&self) {
        let current = lock(&self.current);
        if let Some(cancel) = current.as_ref() {
            cancel.cancel();
            info!("endpoint run cancelled");
        }
    }

    /// Wrap the observers so they only hear from `generation`.
    fn guarded_callbacks(&self, generation: u64) -> RunCallbacks {
        let mut guarded = RunCallbacks::new();

        if let Some(cb) = self.callbacks.on_results.clone() {
            let current = Arc::clone(&self.generation);
            guarded = guarded.on_results(move |snapshot| {
                let current = lock(&current);
                if *current == generation {
                    cb(snapshot);
                } else {
                    debug!(generation, "dropping results from superseded run");
                }
            });
        }

        if let Some(cb) = self.callbacks.on_progress.clone() {
            let current = Arc::clone(&self.generation);
            guarded = guarded.on_progress(move |progress| {
                let current = lock(&current);
                if *current == generation {
                    cb(progress);
                } else {
                    debug!(generation, "dropping progress from superseded run");
                }
            });
        }

        guarded
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
