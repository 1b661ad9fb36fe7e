//! API Middleware
//!
//! Request context and request logging.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::net::IpAddr;
use uuid::Uuid;

use crate::domain::OperationContext;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

// =========================================================================
// Request Context Middleware
// =========================================================================

/// Build the `OperationContext` for a request and echo the correlation ID
/// back in the response.
pub async fn context_middleware(mut request: Request<Body>, next: Next) -> Response {
    let context = context_from_headers(request.headers());
    let correlation_id = context.correlation_id;

    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if let Some(id) = correlation_id {
        if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }
    }

    response
}

/// Correlation ID from `X-Correlation-Id` (generated if absent or not a
/// UUID) and client IP from the first `X-Forwarded-For` entry.
pub fn context_from_headers(headers: &HeaderMap) -> OperationContext {
    let mut context = OperationContext::new();

    if let Some(id) = headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
    {
        context = context.with_correlation_id(id);
    }
    context.ensure_correlation_id();

    if let Some(ip) = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        context = context.with_client_ip(ip);
    }

    context
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let masked_value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());

    let correlation_id = request
        .extensions()
        .get::<OperationContext>()
        .and_then(|ctx| ctx.correlation_id);

    let start = std::time::Instant::now();

    tracing::debug!(
        method = %method,
        uri = %uri,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
