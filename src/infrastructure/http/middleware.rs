//! HTTP Middleware
//!
//! HTTP 状态码错误日志与慢请求日志中间件

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};

/// 超过该耗时的请求记录 warn 日志
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(2);

/// HTTP 状态码错误日志中间件
///
/// 状态码为 4xx / 5xx 或耗时过长时记录日志。
/// 业务错误（errno != 0）在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed = started.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP client error"
        );
    } else if is_slow(elapsed) {
        tracing::warn!(method = %method, uri = %uri, elapsed_ms = elapsed_ms, "Slow HTTP request");
    }

    response
}

fn is_slow(elapsed: Duration) -> bool {
    elapsed > SLOW_REQUEST_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    fn create_test_router() -> Router {
        Router::new()
            .route("/ok", get(|| async { "OK" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
        create_test_router().oneshot(request).await.unwrap().status()
    }

    #[test]
    fn test_slow_request_threshold_is_exclusive() {
        assert!(!is_slow(Duration::from_millis(1999)));
        assert!(!is_slow(SLOW_REQUEST_THRESHOLD));
        assert!(is_slow(Duration::from_millis(2001)));
    }

    #[tokio::test]
    async fn test_statuses_pass_through() {
        assert_eq!(status_of("/ok").await, StatusCode::OK);
        assert_eq!(status_of("/missing").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of("/broken").await, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
