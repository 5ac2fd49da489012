//! Prometheus metrics middleware.
//!
//! Provides HTTP request/response metrics collection, business counters and
//! the `/metrics` export endpoint.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Middleware to record HTTP request metrics.
///
/// Records the following metrics:
/// - `http_requests_total`: Counter with labels (method, path, status)
/// - `http_request_duration_seconds`: Histogram with labels (method, path)
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Count a reservation state change, labelled by target status.
pub fn record_reservation_transition(status: &'static str) {
    counter!("reservations_transitioned_total", "status" => status).increment(1);
}

/// Count an admin decision on a Wave transaction.
pub fn record_wave_decision(decision: &'static str) {
    counter!("wave_transactions_decided_total", "decision" => decision).increment(1);
}

pub fn record_notification_delivered(outcome: &'static str) {
    counter!("notifications_delivered_total", "outcome" => outcome).increment(1);
}

pub fn record_notification_dead_lettered() {
    counter!("notifications_dead_lettered_total").increment(1);
}

/// Record one background job run.
pub fn record_job_run(job: &'static str, outcome: &'static str, duration_secs: f64) {
    counter!("background_job_runs_total", "job" => job, "outcome" => outcome).increment(1);
    histogram!("background_job_duration_seconds", "job" => job).record(duration_secs);
}

pub fn record_outbox_backlog(pending: i64, dead: i64) {
    gauge!("notification_outbox_pending").set(pending as f64);
    gauge!("notification_outbox_dead").set(dead as f64);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Install the global Prometheus recorder.
///
/// Called once at startup before any metric is recorded. A second call is a
/// no-op.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    // Lost race: the recorder installed first keeps serving.
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}
