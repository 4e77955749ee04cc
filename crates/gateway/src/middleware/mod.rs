//! Gateway middleware

pub mod rate_limit;

use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use perdia_common::errors::AppError;
use perdia_common::metrics::RequestMetrics;

/// Reject requests without the configured operator API key.
/// When no key is configured the gateway runs open (dev mode).
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(state.config.auth.api_key_header.as_str())
        .and_then(|v| v.to_str().ok());

    state.api_keys.check(presented)?;

    Ok(next.run(request).await)
}

/// Record request count and latency for every response
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let tracker = RequestMetrics::start(&method, &path);

    let response = next.run(request).await;
    tracker.finish(response.status().as_u16());
    response
}
