//! Outbound HTTP port

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::models::{HttpErrorResponse, HttpRequest, HttpResponse};

/// Outbound HTTP transport.
///
/// Non-success statuses are reported as `Err(HttpErrorResponse)` so callers
/// and the interceptor see one failure shape for server and network errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request`; any non-success status is an error
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpErrorResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpErrorResponse> {
        (**self).send(request).await
    }
}
