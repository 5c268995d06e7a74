//! `reqwest`-backed HTTP transport

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as ReqwestClient;
use std::time::Duration;

use crate::domain::errors::LoggerError;
use crate::domain::models::{HttpErrorResponse, HttpRequest, HttpResponse, RequestBody};
use crate::domain::ports::HttpTransport;

/// Default timeout for a single exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `HttpTransport` over a pooled `reqwest` client.
///
/// Any non-success status is returned as `Err(HttpErrorResponse)`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Transport with the default 30 second timeout
    pub fn new() -> Result<Self, LoggerError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Transport with a per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, LoggerError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| LoggerError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub const fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpErrorResponse> {
        let url = request.url.clone();
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Bytes { content_type, data }
            | RequestBody::File {
                content_type, data, ..
            } => builder.header(CONTENT_TYPE, content_type).body(data),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| HttpErrorResponse::network(url.clone(), e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpErrorResponse::network(url, e.to_string()))?
            .to_vec();

        let response = HttpResponse {
            status,
            url: final_url,
            headers,
            body,
        };
        if status.is_success() {
            Ok(response)
        } else {
            Err(HttpErrorResponse::from_response(&response))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_success_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1}]"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let request = HttpRequest::get(format!("{}/users", server.url())).with_param("page", "2");
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.body, br#"[{"id":1}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_err() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/orders")
            .match_body(mockito::Matcher::Json(json!({"sku": "A1"})))
            .with_status(422)
            .with_body(r#"{"detail":"out of stock"}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let request =
            HttpRequest::post(format!("{}/orders", server.url())).with_json(json!({"sku": "A1"}));
        let error = transport.send(request).await.unwrap_err();

        assert_eq!(error.status, 422);
        assert_eq!(error.error, Some(json!({"detail": "out of stock"})));
    }

    #[tokio::test]
    async fn test_connection_failure_has_status_zero() {
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(2)).unwrap();
        let error = transport
            .send(HttpRequest::get("http://127.0.0.1:9/unreachable"))
            .await
            .unwrap_err();
        assert_eq!(error.status, 0);
        assert_eq!(error.status_text, "Unknown Error");
    }
}
