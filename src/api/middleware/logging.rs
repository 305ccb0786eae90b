use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Logs one line per request; server errors at `warn`, probes at `debug`.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(%method, %path, status, elapsed_ms, "request failed");
    } else if path == "/health" || path == "/ready" {
        debug!(%method, %path, status, elapsed_ms, "probe served");
    } else {
        info!(%method, %path, status, elapsed_ms, "request completed");
    }

    response
}
