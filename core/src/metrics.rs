//! Request outcomes and batch metrics
//!
//! [`Metrics::compute`] is a pure function of a frozen result set and the
//! batch wall-clock duration: identical inputs always produce identical
//! output, and degenerate inputs (zero requests, zero successes) yield
//! zero-valued metrics rather than an error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The recorded result of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    /// Task index within the batch (`0..count`)
    pub index: usize,

    /// Whether the request succeeded (2xx status and a clean body drain)
    pub success: bool,

    /// HTTP status code, when a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Wall-clock duration of the request in fractional milliseconds
    pub duration_ms: f64,

    /// Error description for transport or body-read failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestOutcome {
    /// Outcome for a request that failed before any status was received
    pub fn failed(index: usize, duration_ms: f64, error: impl Into<String>) -> Self {
        Self {
            index,
            success: false,
            status: None,
            duration_ms,
            error: Some(error.into()),
        }
    }
}

/// Latency statistics in milliseconds, over successful outcomes only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LatencyStats {
    /// Arithmetic mean
    pub avg: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
    /// 95th percentile (interpolated)
    pub p95: f64,
    /// 99th percentile (interpolated)
    pub p99: f64,
}

impl LatencyStats {
    fn from_durations(mut durations: Vec<f64>) -> Self {
        if durations.is_empty() {
            return Self::default();
        }

        durations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let len = durations.len();
        let avg = durations.iter().sum::<f64>() / len as f64;

        Self {
            avg,
            min: durations[0],
            max: durations[len - 1],
            p95: percentile(&durations, 95.0),
            p99: percentile(&durations, 99.0),
        }
    }
}

/// Aggregate metrics for one finished batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Total requests issued
    pub total_requests: usize,

    /// Requests that succeeded
    pub successful_requests: usize,

    /// Requests that failed
    pub failed_requests: usize,

    /// Success rate on the 0-100 scale (0 when no requests were issued)
    pub success_rate: f64,

    /// Completed requests per second of batch wall-clock
    pub throughput: f64,

    /// Latency statistics over successful outcomes only
    pub latency: LatencyStats,
}

impl Metrics {
    /// Reduce a frozen result set and the batch wall-clock into a snapshot
    ///
    /// Failed outcomes count toward totals and throughput but are excluded
    /// from the latency block. The input need not be sorted or in index
    /// order; percentiles sort internally.
    pub fn compute(outcomes: &[RequestOutcome], wall_clock: Duration) -> Self {
        let total_requests = outcomes.len();
        let successful_requests = outcomes.iter().filter(|o| o.success).count();
        let failed_requests = total_requests - successful_requests;

        let success_rate = if total_requests > 0 {
            successful_requests as f64 * 100.0 / total_requests as f64
        } else {
            0.0
        };

        let secs = wall_clock.as_secs_f64();
        let throughput = if total_requests > 0 && secs > 0.0 {
            total_requests as f64 / secs
        } else {
            0.0
        };

        let latency = LatencyStats::from_durations(
            outcomes
                .iter()
                .filter(|o| o.success)
                .map(|o| o.duration_ms)
                .collect(),
        );

        Self {
            total_requests,
            successful_requests,
            failed_requests,
            success_rate,
            throughput,
            latency,
        }
    }
}

/// Percentile via linear interpolation between adjacent order statistics
///
/// `sorted` must be ascending; `p` is on the 0-100 scale. A single sample
/// is its own percentile for any `p`; an empty sample yields 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if upper >= sorted.len() {
        return sorted[sorted.len() - 1];
    }

    let frac = rank - lower as f64;
    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}
