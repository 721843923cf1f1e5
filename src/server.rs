//! HTTP API exposing the load-test core

use anyhow::{Context, Result};
use axum::extract::Json;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use msgbench_core::{run_batch, BatchResult, Error, JobDescriptor, Metrics, RequestOutcome};

/// Metrics in the flat shape the frontend consumes
///
/// The core nests latency statistics; the wire contract flattens them
/// into `*ResponseTime` fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendMetrics {
    total_requests: usize,
    successful_requests: usize,
    failed_requests: usize,
    success_rate: f64,
    throughput: f64,
    avg_response_time: f64,
    min_response_time: f64,
    max_response_time: f64,
    p95_response_time: f64,
    p99_response_time: f64,
}

impl From<Metrics> for FrontendMetrics {
    fn from(metrics: Metrics) -> Self {
        Self {
            total_requests: metrics.total_requests,
            successful_requests: metrics.successful_requests,
            failed_requests: metrics.failed_requests,
            success_rate: metrics.success_rate,
            throughput: metrics.throughput,
            avg_response_time: metrics.latency.avg,
            min_response_time: metrics.latency.min,
            max_response_time: metrics.latency.max,
            p95_response_time: metrics.latency.p95,
            p99_response_time: metrics.latency.p99,
        }
    }
}

/// Payload returned for a finished batch, and printed by the CLI
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    success: bool,
    metrics: FrontendMetrics,
    results: Vec<RequestOutcome>,
}

impl From<BatchResult> for RunResponse {
    fn from(batch: BatchResult) -> Self {
        Self {
            success: true,
            metrics: batch.metrics().into(),
            results: batch.outcomes,
        }
    }
}

/// Build the application router
pub fn app() -> Router {
    Router::new()
        .route("/api/load-test", post(run_load_test))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn run_load_test(
    Json(job): Json<JobDescriptor>,
) -> std::result::Result<Json<RunResponse>, (StatusCode, Json<Value>)> {
    if job.endpoint.is_empty() {
        return Err(bad_request("endpoint is required"));
    }
    if job.target.is_empty() {
        return Err(bad_request("target is required"));
    }

    match run_batch(job).await {
        Ok(batch) => Ok(Json(batch.into())),
        Err(Error::Config(e)) => Err(bad_request(&e.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "load test failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            ))
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "msgbench",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Bind and serve the API on the given port
pub async fn serve(port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "listening");
    axum::serve(listener, app())
        .await
        .context("server terminated")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "msgbench");
    }

    #[test]
    fn test_run_response_flattens_latency() {
        let batch = BatchResult {
            outcomes: vec![RequestOutcome {
                index: 0,
                success: true,
                status: Some(200),
                duration_ms: 10.0,
                error: None,
            }],
            wall_clock: std::time::Duration::from_millis(10),
        };

        let body = serde_json::to_value(RunResponse::from(batch)).unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["metrics"]["totalRequests"], 1);
        assert_eq!(body["metrics"]["avgResponseTime"], 10.0);
        assert_eq!(body["metrics"]["minResponseTime"], 10.0);
        assert_eq!(body["metrics"]["maxResponseTime"], 10.0);
        assert_eq!(body["metrics"]["p95ResponseTime"], 10.0);
        assert_eq!(body["metrics"]["p99ResponseTime"], 10.0);
        assert!(body["metrics"].get("latency").is_none());
        assert_eq!(body["results"][0]["durationMs"], 10.0);
    }

    #[tokio::test]
    async fn test_load_test_rejects_missing_endpoint() {
        let payload = json!({
            "scenario": "get",
            "count": 1,
            "target": "u1",
            "concurrency": 1,
            "endpoint": ""
        });

        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/load-test")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_load_test_rejects_invalid_concurrency() {
        let payload = json!({
            "scenario": "get",
            "count": 1,
            "target": "u1",
            "concurrency": 0,
            "endpoint": "http://backend.test"
        });

        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/load-test")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("invalid concurrency"));
    }
}
