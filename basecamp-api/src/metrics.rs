use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

use crate::{error::AppError, state::AppState};

/// HTTP request metrics registered on a private registry.
pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("basecamp_http_requests_total", "HTTP requests by method and status"),
            &["method", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("basecamp_http_request_duration_seconds", "HTTP request latency"),
            &["method"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
        })
    }

    pub fn observe(&self, method: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, status.as_str()])
            .inc();
        self.request_duration.with_label_values(&[method]).observe(seconds);
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();

    let response = next.run(req).await;

    state
        .metrics
        .observe(&method, response.status().as_u16(), started.elapsed().as_secs_f64());
    response
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::InternalServerError(format!("Metrics encoding failed: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_observed_requests() {
        let metrics = Metrics::new().unwrap();
        metrics.observe("GET", 200, 0.012);
        metrics.observe("GET", 200, 0.020);
        metrics.observe("POST", 401, 0.001);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"basecamp_http_requests_total{method="GET",status="200"} 2"#));
        assert!(text.contains(r#"basecamp_http_requests_total{method="POST",status="401"} 1"#));
        assert!(text.contains("basecamp_http_request_duration_seconds_bucket"));
    }
}
