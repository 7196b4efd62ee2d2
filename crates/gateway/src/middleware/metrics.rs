//! Per-request metrics middleware

use axum::{extract::Request, middleware::Next, response::Response};
use storyhaven_common::metrics::Timer;

/// Count each request and record its latency
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let timer = Timer::start("storyhaven_request_duration_seconds");

    let response = next.run(request).await;

    metrics::counter!(
        "storyhaven_requests_total",
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    timer.record();

    response
}
