//! Request middleware.

use std::sync::atomic::Ordering;

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use rand::Rng;

use crate::metrics::METRICS;

/// Correlation id for one request, available to handlers via extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Take the caller's `x-request-id` or mint one, stash it in extensions,
/// and echo it on the response.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    METRICS.requests_total.fetch_add(1, Ordering::Relaxed);

    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| format!("gw-{:016x}", rand::thread_rng().gen::<u64>()));

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
