//! Transport seam between the request executor and the network
//!
//! The [`Transport`] trait is the injection point for tests: the executor
//! plans requests, the transport performs them. The production
//! implementation wraps a pooled `reqwest::Client`.

use async_trait::async_trait;
use std::time::Duration;

/// HTTP method for a planned request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully-specified request ready to be sent
#[derive(Debug, Clone)]
pub struct PlannedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute request URL
    pub url: String,
    /// Header name/value pairs attached to the request
    pub headers: Vec<(&'static str, String)>,
}

/// Transport-level errors, recorded per request and never escalated
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failure, timeout, or DNS failure; no status was received
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body could not be drained after a status was received
    #[error("body read failed after status {status}: {message}")]
    Read {
        /// Status code of the response whose body failed to drain
        status: u16,
        /// Captured error text
        message: String,
    },
}

/// Sends one planned request and reports the resulting HTTP status
///
/// Implementations must fully drain the response body before returning,
/// regardless of status, so the underlying connection can be reused.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request, returning the status code once the body has
    /// been drained
    async fn send(&self, request: &PlannedRequest) -> std::result::Result<u16, TransportError>;
}

/// reqwest-backed transport used outside of tests
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the standard client tuning: 30 s overall
    /// timeout, 10 s connect timeout, 90 s idle timeout, at most 20 idle
    /// connections per host.
    ///
    /// The per-request timeout bounds the worst-case occupancy of a
    /// concurrency token; a hung request cannot stall a batch indefinitely.
    pub fn new() -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(20)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PlannedRequest) -> std::result::Result<u16, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Transport(e.to_string()))?;
        let status = response.status().as_u16();

        // Drain even on non-2xx so the connection returns to the pool.
        if let Err(e) = response.bytes().await {
            return Err(TransportError::Read {
                status,
                message: e.to_string(),
            });
        }

        Ok(status)
    }
}
