//! Shared fixtures for the integration tests

use applog::domain::models::{HttpErrorResponse, HttpRequest, HttpResponse, LoggerConfig};
use applog::domain::ports::HttpTransport;
use applog::infrastructure::logging::CapturedConsole;
use applog::{Logger, LoggerBuilder};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temporary SQLite database path
///
/// The returned `TempDir` must outlive the store.
#[allow(dead_code)]
pub fn temp_db_path() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path: PathBuf = dir.path().join("logs.db");
    (dir, db_path.display().to_string())
}

/// Transport that records every request and answers with a fixed JSON body
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<HttpRequest>>,
    pub fail_with: Option<u16>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn failing(status: u16) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_with: Some(status),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpErrorResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let status = self
            .fail_with
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK);
        let response = HttpResponse {
            status,
            url,
            headers,
            body: br#"{"ok":true,"token":"server-secret"}"#.to_vec(),
        };
        if status.is_success() {
            Ok(response)
        } else {
            Err(HttpErrorResponse::from_response(&response))
        }
    }
}

/// Builder pre-wired with a captured console
#[allow(dead_code)]
pub fn captured_builder(config: LoggerConfig) -> (LoggerBuilder, Arc<CapturedConsole>) {
    let console = Arc::new(CapturedConsole::new());
    (Logger::builder(config).console(console.clone()), console)
}

/// JSON payload following the ` | ` separator of a console line
#[allow(dead_code)]
pub fn payload_of(line: &str) -> Option<Value> {
    let (_, json) = line.split_once(" | ")?;
    serde_json::from_str(json).ok()
}
