//! Batch dispatch with bounded concurrency
//!
//! The dispatcher spawns one task per request and gates them through a
//! semaphore sized to the descriptor's concurrency ceiling. A permit is
//! held for the full lifetime of a request, so at most `concurrency`
//! requests are in flight at any instant. The batch wall-clock spans the
//! entire fan-out and fan-in, which makes the derived throughput an
//! honest requests-per-second figure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;

use crate::collector::ResultCollector;
use crate::config::JobDescriptor;
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::metrics::{Metrics, RequestOutcome};
use crate::transport::{HttpTransport, Transport};


/// The frozen output of one batch
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Per-request outcomes in arrival order, exactly `count` of them
    pub outcomes: Vec<RequestOutcome>,
    /// Wall-clock duration of the whole batch
    pub wall_clock: Duration,
}

impl BatchResult {
    /// Aggregate metrics for this batch
    pub fn metrics(&self) -> Metrics {
        Metrics::compute(&self.outcomes, self.wall_clock)
    }
}

/// Runs batches over a shared transport
#[derive(Debug, Clone)]
pub struct Dispatcher {
    executor: RequestExecutor,
}

impl Dispatcher {
    /// Create a dispatcher over the given transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: RequestExecutor::new(transport),
        }
    }

    /// Run one batch to completion
    ///
    /// Validates the descriptor, issues exactly `count` requests with at
    /// most `concurrency` in flight, and returns once every request has
    /// finished. Individual request failures are recorded as outcomes and
    /// never abort the batch.
    ///
    /// # Errors
    /// Returns an error only if the descriptor fails validation; no
    /// requests are issued in that case.
    pub async fn run(&self, job: JobDescriptor) -> Result<BatchResult> {
        job.validate()?;

        tracing::info!(
            tech = %job.tech,
            scenario = %job.scenario,
            count = job.count,
            concurrency = job.concurrency,
            "starting batch"
        );

        let job = Arc::new(job);
        let semaphore = Arc::new(Semaphore::new(job.concurrency));
        let collector = ResultCollector::new(job.count);

        let started = Instant::now();

        let mut handles = Vec::with_capacity(job.count);
        for index in 0..job.count {
            let job = Arc::clone(&job);
            let semaphore = Arc::clone(&semaphore);
            let collector = collector.clone();
            let executor = self.executor.clone();

            handles.push(tokio::spawn(async move {
                // Permit is held until the request fully completes.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("batch semaphore closed");
                let outcome = executor.execute(&job, index).await;
                collector.record(outcome).await;
            }));
        }

        // Completion barrier: no partial result set ever escapes.
        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!(index, error = %e, "request task panicked");
                collector
                    .record(RequestOutcome::failed(index, 0.0, e.to_string()))
                    .await;
            }
        }

        let wall_clock = started.elapsed();
        let outcomes = collector.into_results().await;

        tracing::info!(
            total = outcomes.len(),
            successful = outcomes.iter().filter(|o| o.success).count(),
            elapsed_ms = wall_clock.as_millis() as u64,
            "batch finished"
        );

        Ok(BatchResult {
            outcomes,
            wall_clock,
        })
    }
}

/// Run one batch against the real network
///
/// Convenience entry point that builds an [`HttpTransport`] with the
/// standard client tuning and dispatches the job on it.
pub async fn run_batch(job: JobDescriptor) -> Result<BatchResult> {
    let transport = Arc::new(HttpTransport::new()?);
    Dispatcher::new(transport).run(job).await
}
