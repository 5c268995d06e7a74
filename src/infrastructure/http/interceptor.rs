//! HTTP observability interceptor
//!
//! Wraps a transport and logs each exchange through the leveled logger:
//! the outgoing request, then either the response or the error, then a
//! completion line. All three share a `req-<millis>-<n>` correlation id.
//! Requests that opt out, or that target the logging endpoint, pass straight
//! through so the remote sink can never observe its own traffic.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::domain::models::{HttpErrorResponse, HttpRequest, HttpResponse};
use crate::domain::ports::HttpTransport;
use crate::infrastructure::logging::redaction::{redact_headers, sanitize, sanitize_body};
use crate::services::Logger;

/// Source label attached to every interceptor entry
pub const INTERCEPTOR_SOURCE: &str = "LoggingInterceptor";

/// Correlation id of the form `req-<epoch millis>-<0..9999>`
pub fn generate_request_id() -> String {
    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("req-{}-{suffix}", Utc::now().timestamp_millis())
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Summary of a response body: the sanitized JSON document for JSON
/// content, size for other text, and a marker for binary content.
pub fn response_body_summary(response: &HttpResponse) -> Value {
    let content_type = response.content_type();
    if content_type.contains("json") {
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(body) => sanitize(&body),
            Err(_) if response.body.is_empty() => Value::Null,
            Err(_) => json!({ "type": content_type, "size": response.body.len() }),
        }
    } else if !content_type.contains("octet-stream") && !content_type.contains("image/") {
        json!({ "type": content_type, "size": response.body.len() })
    } else {
        json!({ "type": content_type, "size": "binary data" })
    }
}

/// Writes the completion line when dropped, so an exchange whose future is
/// cancelled still gets one.
struct CompletionLine<'a> {
    logger: &'a Logger,
    request_id: String,
    start: Instant,
}

impl Drop for CompletionLine<'_> {
    fn drop(&mut self) {
        let elapsed = elapsed_ms(self.start);
        self.logger.debug(
            INTERCEPTOR_SOURCE,
            format!("Request {} completed in {elapsed}ms", self.request_id),
            Some(json!({ "requestId": self.request_id, "elapsedTime": elapsed })),
        );
    }
}

/// `HttpTransport` wrapper that logs each exchange through a `Logger`
pub struct LoggingInterceptor<T> {
    inner: T,
    logger: Arc<Logger>,
    log_endpoint_marker: String,
}

impl<T: HttpTransport> LoggingInterceptor<T> {
    /// The logging endpoint marker is taken from the logger configuration.
    pub fn new(inner: T, logger: Arc<Logger>) -> Self {
        let log_endpoint_marker = logger.config().log_endpoint_marker.clone();
        Self {
            inner,
            logger,
            log_endpoint_marker,
        }
    }

    /// Override the URL fragment that marks the logging endpoint
    #[must_use]
    pub fn with_log_endpoint_marker(mut self, marker: impl Into<String>) -> Self {
        self.log_endpoint_marker = marker.into();
        self
    }

    /// Whether the request bypasses observation
    pub fn is_excluded(&self, request: &HttpRequest) -> bool {
        request.context.disable_logging
            || (!self.log_endpoint_marker.is_empty()
                && request.url.contains(&self.log_endpoint_marker))
    }

    fn log_request(&self, request: &HttpRequest, request_id: &str) {
        self.logger.debug(
            INTERCEPTOR_SOURCE,
            format!("HTTP Request {request_id}: {} {}", request.method, request.url),
            Some(json!({
                "requestId": request_id,
                "method": request.method.as_str(),
                "url": request.url,
                "headers": redact_headers(&request.headers),
                "params": request.params_string(),
                "body": sanitize_body(&request.body),
            })),
        );
    }

    fn log_response(&self, response: &HttpResponse, request_id: &str, elapsed: u64) {
        self.logger.debug(
            INTERCEPTOR_SOURCE,
            format!(
                "HTTP Response {request_id}: {} ({elapsed}ms)",
                response.status.as_u16()
            ),
            Some(json!({
                "requestId": request_id,
                "status": response.status.as_u16(),
                "statusText": response.status_text(),
                "url": response.url,
                "elapsedTime": elapsed,
                "headers": redact_headers(&response.headers),
                "body": response_body_summary(response),
            })),
        );
    }

    fn log_error(&self, error: &HttpErrorResponse, request_id: &str, elapsed: u64) {
        self.logger.error(
            INTERCEPTOR_SOURCE,
            format!(
                "HTTP Error {request_id}: {} {} ({elapsed}ms)",
                error.status, error.status_text
            ),
            Some(json!({
                "requestId": request_id,
                "status": error.status,
                "statusText": error.status_text,
                "url": error.url,
                "elapsedTime": elapsed,
                "message": error.message,
                "error": error.error,
            })),
        );
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for LoggingInterceptor<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpErrorResponse> {
        if self.is_excluded(&request) {
            return self.inner.send(request).await;
        }

        let request_id = generate_request_id();
        let start = Instant::now();
        self.log_request(&request, &request_id);
        let completion = CompletionLine {
            logger: &self.logger,
            request_id: request_id.clone(),
            start,
        };

        let result = self.inner.send(request).await;

        let elapsed = elapsed_ms(start);
        match &result {
            Ok(response) => self.log_response(response, &request_id, elapsed),
            Err(error) => self.log_error(error, &request_id, elapsed),
        }
        drop(completion);
        result
    }
}
