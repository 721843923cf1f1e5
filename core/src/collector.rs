//! Thread-safe accumulation of outcomes during a batch

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::metrics::RequestOutcome;

/// Accumulates outcomes from concurrent request tasks
///
/// Outcomes land in arrival order, not index order; the order carries no
/// meaning and the aggregator sorts before computing percentiles. After
/// the dispatcher's completion barrier the set is frozen via
/// [`ResultCollector::into_results`]. Clones share the same accumulator.
#[derive(Debug, Clone)]
pub struct ResultCollector {
    outcomes: Arc<Mutex<Vec<RequestOutcome>>>,
}

impl ResultCollector {
    /// Create a collector with room for `capacity` outcomes
    pub fn new(capacity: usize) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::with_capacity(capacity))),
        }
    }

    /// Append one outcome
    pub async fn record(&self, outcome: RequestOutcome) {
        self.outcomes.lock().await.push(outcome);
    }

    /// Number of outcomes recorded so far
    pub async fn len(&self) -> usize {
        self.outcomes.lock().await.len()
    }

    /// Whether no outcomes have been recorded yet
    pub async fn is_empty(&self) -> bool {
        self.outcomes.lock().await.is_empty()
    }

    /// Freeze the collection and take ownership of the result set
    ///
    /// Call only after every recording task has finished.
    pub async fn into_results(self) -> Vec<RequestOutcome> {
        match Arc::try_unwrap(self.outcomes) {
            Ok(mutex) => mutex.into_inner(),
            // A clone is still alive somewhere; drain through the lock.
            Err(arc) => arc.lock().await.drain(..).collect(),
        }
    }
}
