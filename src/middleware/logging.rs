use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

// Bodies larger than this are not buffered for logging
const BODY_LIMIT: usize = 1024 * 1024;
const LOG_BODY_MAX: usize = 2000;

/// Middleware that logs each request and its response, tagged with a
/// per-request id
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let (parts, body) = request.into_parts();

    let request_bytes = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(request_id = %request_id, "Failed to read request body: {}", e);
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        body = %truncate_body(&String::from_utf8_lossy(&request_bytes)),
        "→ Request"
    );

    let request = Request::from_parts(parts, Body::from(request_bytes));
    let response = next.run(request).await;

    let status = response.status();
    let (parts, body) = response.into_parts();

    let response_bytes = to_bytes(body, BODY_LIMIT).await.unwrap_or_else(|e| {
        tracing::error!(request_id = %request_id, "Failed to read response body: {}", e);
        Default::default()
    });

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        body = %truncate_body(&String::from_utf8_lossy(&response_bytes)),
        "← Response"
    );

    Response::from_parts(parts, Body::from(response_bytes))
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= LOG_BODY_MAX {
        body.to_string()
    } else {
        format!(
            "{}...[truncated, {} bytes total]",
            &body[..LOG_BODY_MAX],
            body.len()
        )
    }
}
