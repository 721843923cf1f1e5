//! msgbench-core: bounded-concurrency HTTP load generation and statistics
//!
//! This crate provides the core of the msgbench load-test harness,
//! including:
//!
//! - Job descriptor validation
//! - Single-request execution over an injectable transport
//! - Bounded-concurrency dispatch with a completion barrier
//! - Latency/throughput aggregation with interpolated percentiles

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod transport;

pub use collector::ResultCollector;
pub use config::{ConfigError, JobDescriptor, Scenario, MAX_CONCURRENCY};
pub use dispatcher::{run_batch, BatchResult, Dispatcher};
pub use error::{Error, Result};
pub use executor::RequestExecutor;
pub use metrics::{percentile, LatencyStats, Metrics, RequestOutcome};
pub use transport::{HttpMethod, HttpTransport, PlannedRequest, Transport, TransportError};
