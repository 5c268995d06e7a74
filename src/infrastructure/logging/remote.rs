//! Remote sink: ships INFO+ entries to the configured endpoint as JSON POSTs.

use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::console::ConsoleSink;
use super::queue::BoundedQueue;
use super::redaction::to_payload;
use crate::domain::models::{HttpRequest, LogEntry};
use crate::domain::ports::HttpTransport;

/// Fire-and-forget sender backed by a single worker task.
///
/// Every request is marked so the interceptor leaves it alone. Failures are
/// reported on the console error channel and never retried.
pub struct RemoteSink {
    endpoint: String,
    queue: Arc<BoundedQueue<LogEntry>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RemoteSink {
    /// Start the sender task on `runtime`
    pub fn spawn(
        endpoint: String,
        transport: Arc<dyn HttpTransport>,
        console: ConsoleSink,
        capacity: usize,
        runtime: &Handle,
    ) -> Self {
        let queue = Arc::new(BoundedQueue::new(capacity));
        let worker = runtime.spawn(run_sender(
            endpoint.clone(),
            queue.clone(),
            transport,
            console,
        ));
        Self {
            endpoint,
            queue,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// URL entries are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Queue an entry. Entries below INFO are ignored.
    pub fn emit(&self, entry: LogEntry) {
        if entry.level.is_remotable() {
            self.queue.push(entry);
        }
    }

    /// Entries discarded by a full or closed queue
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Entries waiting to be sent
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Stop accepting entries and wait for the sender to finish what is
    /// queued.
    pub async fn shutdown(&self) {
        self.queue.close();
        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "remote log sender ended abnormally");
            }
        }
    }
}

impl Drop for RemoteSink {
    fn drop(&mut self) {
        self.queue.close();
    }
}

async fn run_sender(
    endpoint: String,
    queue: Arc<BoundedQueue<LogEntry>>,
    transport: Arc<dyn HttpTransport>,
    console: ConsoleSink,
) {
    debug!(endpoint = %endpoint, "remote log sender started");
    while let Some(entry) = queue.recv().await {
        let request = HttpRequest::post(endpoint.as_str())
            .with_json(to_payload(&entry))
            .without_logging();
        if let Err(e) = transport.send(request).await {
            console.report_failure("Remote logging failed", &e);
        }
    }
    debug!(endpoint = %endpoint, "remote log sender stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{HttpErrorResponse, HttpResponse, Severity};
    use crate::infrastructure::logging::console::CapturedConsole;
    use async_trait::async_trait;
    use chrono::Utc;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;

    #[derive(Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<HttpRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpErrorResponse> {
            let url = request.url.clone();
            self.requests.lock().unwrap().push(request);
            if self.fail {
                return Err(HttpErrorResponse::network(url, "connection refused"));
            }
            Ok(HttpResponse {
                status: StatusCode::OK,
                url,
                headers: HeaderMap::new(),
                body: Vec::new(),
            })
        }
    }

    fn entry(level: Severity) -> LogEntry {
        LogEntry::new(level, "Orders.submit", "placed", None, Utc::now())
    }

    #[tokio::test]
    async fn test_only_info_and_above_are_sent() {
        let transport = Arc::new(RecordingTransport::default());
        let console = ConsoleSink::new(Arc::new(CapturedConsole::new()), false, false);
        let sink = RemoteSink::spawn(
            "http://collector/logs".to_string(),
            transport.clone(),
            console,
            16,
            &Handle::current(),
        );

        sink.emit(entry(Severity::Trace));
        sink.emit(entry(Severity::Debug));
        sink.emit(entry(Severity::Error));
        sink.shutdown().await;

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.context.disable_logging);
        assert_eq!(request.method, reqwest::Method::POST);
        match &request.body {
            crate::domain::models::RequestBody::Json(body) => {
                assert_eq!(body["level"], 4);
                assert_eq!(body["source"], "Orders.submit");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_goes_to_console_only() {
        let transport = Arc::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        let captured = Arc::new(CapturedConsole::new());
        let console = ConsoleSink::new(captured.clone(), false, false);
        let sink = RemoteSink::spawn(
            "http://collector/logs".to_string(),
            transport.clone(),
            console,
            16,
            &Handle::current(),
        );

        sink.emit(entry(Severity::Warn));
        sink.shutdown().await;

        assert_eq!(transport.requests.lock().unwrap().len(), 1);
        let texts = captured.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("Remote logging failed"));
    }
}
