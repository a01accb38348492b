//! pulse-health — concurrent endpoint probing for pulse.
//!
//! Probes an endpoint catalog in fixed-size concurrent batches, classifies
//! each response into a health outcome, and reports progress after every
//! change. Runs are cooperatively cancellable.
//!
//! # Architecture
//!
//! ```text
//! HealthRunner::start_run() → RunHandle
//!   └── BatchRunner::run()  (spawned task)
//!       ├── per batch: one task per endpoint (JoinSet, wait-for-all)
//!       │   ├── ProbeClient::get / post  ← CancelToken
//!       │   └── classify() → Success | Error (cancelled stays Pending)
//!       └── after every change: on_results(snapshot), on_progress(aggregate())
//! ```
//!
//! # Classification
//!
//! The probe checks that routes exist, not that they behave. 404, 400/422,
//! 500 and 503 all prove the route is wired up and count as success. 405,
//! unexpected auth rejections and unknown failures are errors.

pub mod cancel;
pub mod classifier;
pub mod client;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod runner;

pub use cancel::CancelToken;
pub use classifier::{Classification, classify, classify_status};
pub use client::{HyperProbeClient, ProbeClient, ProbeResponse};
pub use error::{ProbeError, RunError, RunResult};
pub use orchestrator::{HealthRunner, RunHandle};
pub use progress::aggregate;
pub use runner::{BatchRunner, DEFAULT_BATCH_SIZE, ProgressCallback, ResultsCallback, RunCallbacks};
