//! Single-request execution

use std::sync::Arc;
use std::time::Instant;

use crate::config::JobDescriptor;
use crate::metrics::RequestOutcome;
use crate::transport::{HttpMethod, PlannedRequest, Transport, TransportError};

/// Performs exactly one request per invocation and reports its outcome
///
/// Failures never escalate: every exit path produces a [`RequestOutcome`],
/// so an individual request can never abort the batch it belongs to.
/// Clones share the same transport.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
}

impl RequestExecutor {
    /// Create an executor over the given transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute the request for the task at `index`
    ///
    /// Duration is measured from just before request construction through
    /// completion of the body drain, in fractional milliseconds.
    pub async fn execute(&self, job: &JobDescriptor, index: usize) -> RequestOutcome {
        let started = Instant::now();
        let request = plan_request(job, index);
        let result = self.transport.send(&request).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(status) if (200..300).contains(&status) => RequestOutcome {
                index,
                success: true,
                status: Some(status),
                duration_ms,
                error: None,
            },
            Ok(status) => {
                tracing::warn!(index, status, "request returned non-success status");
                RequestOutcome {
                    index,
                    success: false,
                    status: Some(status),
                    duration_ms,
                    error: None,
                }
            }
            // A failed drain overrides the received status.
            Err(TransportError::Read { status, message }) => {
                tracing::warn!(index, status, error = %message, "response body drain failed");
                RequestOutcome {
                    index,
                    success: false,
                    status: Some(status),
                    duration_ms,
                    error: Some(message),
                }
            }
            Err(TransportError::Transport(message)) => {
                tracing::warn!(index, error = %message, "request failed");
                RequestOutcome {
                    index,
                    success: false,
                    status: None,
                    duration_ms,
                    error: Some(message),
                }
            }
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}

/// Build the planned request for the task at `index`
///
/// POST URLs embed the index and a nanosecond timestamp so no two calls
/// collide on idempotency or caching; GETs read a fixed page for the
/// target.
fn plan_request(job: &JobDescriptor, index: usize) -> PlannedRequest {
    let method = job.scenario.method_for(index);

    let url = match method {
        HttpMethod::Post => format!(
            "{}/api/message/send?toUserId={}&message=TestMessage_{}_{}",
            job.endpoint,
            job.target,
            index,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        ),
        HttpMethod::Get => format!(
            "{}/api/message/message?type=user&target={}&page=0",
            job.endpoint, job.target,
        ),
    };

    let headers = vec![
        ("Authorization", format!("Bearer {}", job.token)),
        ("version", "1".to_string()),
        ("Content-Type", "application/json".to_string()),
    ];

    PlannedRequest {
        method,
        url,
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scenario;

    use async_trait::async_trait;
    use std::sync::Mutex;

    fn descriptor(scenario: Scenario) -> JobDescriptor {
        JobDescriptor {
            tech: "rust".to_string(),
            scenario,
            count: 10,
            target: "u1".to_string(),
            concurrency: 2,
            endpoint: "http://backend.test".to_string(),
            token: "secret".to_string(),
        }
    }

    /// Captures every planned request and answers with a fixed result.
    struct CapturingTransport {
        requests: Mutex<Vec<PlannedRequest>>,
        reply: fn() -> Result<u16, TransportError>,
    }

    impl CapturingTransport {
        fn replying(reply: fn() -> Result<u16, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn requests(&self) -> Vec<PlannedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for CapturingTransport {
        async fn send(&self, request: &PlannedRequest) -> Result<u16, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            (self.reply)()
        }
    }

    #[tokio::test]
    async fn test_mixed_scenario_method_per_index() {
        let transport = CapturingTransport::replying(|| Ok(200));
        let executor = RequestExecutor::new(transport.clone());
        let job = descriptor(Scenario::Mixed);

        for index in 0..10 {
            executor.execute(&job, index).await;
        }

        let requests = transport.requests();
        assert_eq!(requests.len(), 10);
        for (index, request) in requests.iter().enumerate() {
            let expected = if index % 2 == 0 {
                HttpMethod::Post
            } else {
                HttpMethod::Get
            };
            assert_eq!(request.method, expected, "index {index}");
        }
    }

    #[tokio::test]
    async fn test_post_url_unique_per_call() {
        let transport = CapturingTransport::replying(|| Ok(200));
        let executor = RequestExecutor::new(transport.clone());
        let job = descriptor(Scenario::Post);

        executor.execute(&job, 4).await;
        executor.execute(&job, 4).await;

        let requests = transport.requests();
        assert!(requests[0]
            .url
            .starts_with("http://backend.test/api/message/send?toUserId=u1&message=TestMessage_4_"));
        assert_ne!(requests[0].url, requests[1].url);
    }

    #[tokio::test]
    async fn test_get_url_fixed_page() {
        let transport = CapturingTransport::replying(|| Ok(200));
        let executor = RequestExecutor::new(transport.clone());
        let job = descriptor(Scenario::Get);

        executor.execute(&job, 7).await;

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "http://backend.test/api/message/message?type=user&target=u1&page=0"
        );
    }

    #[tokio::test]
    async fn test_headers_attached() {
        let transport = CapturingTransport::replying(|| Ok(200));
        let executor = RequestExecutor::new(transport.clone());
        let job = descriptor(Scenario::Get);

        executor.execute(&job, 0).await;

        let request = &transport.requests()[0];
        assert!(request
            .headers
            .contains(&("Authorization", "Bearer secret".to_string())));
        assert!(request.headers.contains(&("version", "1".to_string())));
        assert!(request
            .headers
            .contains(&("Content-Type", "application/json".to_string())));
    }

    #[tokio::test]
    async fn test_success_on_2xx() {
        let transport = CapturingTransport::replying(|| Ok(204));
        let executor = RequestExecutor::new(transport);
        let outcome = executor.execute(&descriptor(Scenario::Get), 0).await;

        assert!(outcome.success);
        assert_eq!(outcome.status, Some(204));
        assert!(outcome.error.is_none());
        assert!(outcome.duration_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_failure_on_non_2xx() {
        let transport = CapturingTransport::replying(|| Ok(500));
        let executor = RequestExecutor::new(transport);
        let outcome = executor.execute(&descriptor(Scenario::Get), 0).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, Some(500));
    }

    #[tokio::test]
    async fn test_failure_on_3xx() {
        let transport = CapturingTransport::replying(|| Ok(301));
        let executor = RequestExecutor::new(transport);
        let outcome = executor.execute(&descriptor(Scenario::Get), 0).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, Some(301));
    }

    #[tokio::test]
    async fn test_transport_failure_has_no_status() {
        let transport = CapturingTransport::replying(|| {
            Err(TransportError::Transport("connection refused".to_string()))
        });
        let executor = RequestExecutor::new(transport);
        let outcome = executor.execute(&descriptor(Scenario::Get), 3).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, None);
        assert_eq!(outcome.error.as_deref(), Some("connection refused"));
        assert_eq!(outcome.index, 3);
    }

    #[tokio::test]
    async fn test_drain_failure_overrides_success() {
        let transport = CapturingTransport::replying(|| {
            Err(TransportError::Read {
                status: 200,
                message: "unexpected EOF".to_string(),
            })
        });
        let executor = RequestExecutor::new(transport);
        let outcome = executor.execute(&descriptor(Scenario::Get), 0).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, Some(200));
        assert_eq!(outcome.error.as_deref(), Some("unexpected EOF"));
    }
}
