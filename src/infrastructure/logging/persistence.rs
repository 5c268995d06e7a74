//! Local persistence sink
//!
//! Callers push entries onto a bounded queue and return immediately. A
//! single drain worker takes everything queued, appends the formatted lines
//! to each entry's day file, inserts the indexed records, then runs the
//! retention sweep. Storage failures are reported on the console and the
//! worker keeps going.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::console::ConsoleSink;
use super::queue::{BoundedQueue, PushOutcome};
use super::retention::RetentionPolicy;
use crate::domain::errors::StoreResult;
use crate::domain::models::{LogEntry, LogFile};
use crate::domain::ports::{Clock, FileAppend, LogStore, WriteBatch};

/// Pause between drain passes when entries arrived during a pass
pub const DEFAULT_REDRAIN_DELAY: Duration = Duration::from_millis(100);

/// Tuning of the persistence sink
#[derive(Debug, Clone, Copy)]
pub struct PersistenceSettings {
    /// Day files kept by the retention sweep
    pub max_files: usize,
    /// Size cap on one day file, in bytes
    pub max_file_size: u64,
    /// Queue capacity
    pub capacity: usize,
    /// Pause between drain passes when more entries arrived
    pub redrain_delay: Duration,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_file_size: 10 * 1024 * 1024,
            capacity: 10_000,
            redrain_delay: DEFAULT_REDRAIN_DELAY,
        }
    }
}

/// Build the write for one drain pass.
///
/// Lines are grouped by each entry's own date, keeping queue order inside a
/// day. Every touched file is stamped with `modified_at`.
pub fn build_batch(
    entries: &[LogEntry],
    modified_at: chrono::DateTime<chrono::Utc>,
    max_file_size: u64,
) -> WriteBatch {
    let mut chunks: BTreeMap<String, String> = BTreeMap::new();
    for entry in entries {
        let chunk = chunks.entry(entry.date()).or_default();
        chunk.push_str(&entry.file_line());
        chunk.push('\n');
    }

    WriteBatch {
        appends: chunks
            .into_iter()
            .map(|(date, chunk)| FileAppend {
                name: LogFile::name_for_date(&date),
                date,
                chunk,
                modified_at,
            })
            .collect(),
        records: entries.iter().map(LogEntry::to_record).collect(),
        max_file_size,
    }
}

/// Sink queueing entries for the local store.
///
/// A single drain worker batches queued entries into one store write and
/// runs the retention sweep after each pass.
pub struct PersistenceSink {
    queue: Arc<BoundedQueue<LogEntry>>,
    enqueued: AtomicU64,
    settled: Arc<watch::Sender<u64>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct DrainWorker {
    queue: Arc<BoundedQueue<LogEntry>>,
    settled: Arc<watch::Sender<u64>>,
    store: Arc<dyn LogStore>,
    console: ConsoleSink,
    clock: Arc<dyn Clock>,
    retention: RetentionPolicy,
    settings: PersistenceSettings,
}

impl PersistenceSink {
    /// Start the drain worker on `runtime`
    pub fn spawn(
        store: Arc<dyn LogStore>,
        console: ConsoleSink,
        clock: Arc<dyn Clock>,
        settings: PersistenceSettings,
        runtime: &Handle,
    ) -> Self {
        let queue = Arc::new(BoundedQueue::new(settings.capacity));
        let (settled, _) = watch::channel(0_u64);
        let settled = Arc::new(settled);

        let worker = DrainWorker {
            queue: queue.clone(),
            settled: settled.clone(),
            store,
            console,
            clock,
            retention: RetentionPolicy::new(settings.max_files),
            settings,
        };
        let handle = runtime.spawn(worker.run());

        Self {
            queue,
            enqueued: AtomicU64::new(0),
            settled,
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Queue an entry for persistence. Never waits.
    pub fn persist(&self, entry: LogEntry) {
        match self.queue.push(entry) {
            PushOutcome::Accepted => {
                self.enqueued.fetch_add(1, Ordering::AcqRel);
            }
            PushOutcome::DisplacedOldest => {
                // The displaced entry will never be written
                self.enqueued.fetch_add(1, Ordering::AcqRel);
                self.settled.send_modify(|n| *n += 1);
            }
            PushOutcome::Closed => {}
        }
    }

    /// Wait until every entry queued before this call has been written or
    /// dropped.
    pub async fn flush(&self) {
        let target = self.enqueued.load(Ordering::Acquire);
        let mut settled = self.settled.subscribe();
        let _ = settled.wait_for(|n| *n >= target).await;
    }

    /// Flush, then stop the drain worker.
    pub async fn shutdown(&self) {
        self.queue.close();
        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "persistence drain worker ended abnormally");
            }
        }
    }

    /// Entries discarded by a full or closed queue
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Entries waiting for the next drain pass
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Drop for PersistenceSink {
    fn drop(&mut self) {
        // The worker drains what is left, then exits.
        self.queue.close();
    }
}

/// Marks every entry settled once the worker is gone, whether it stopped
/// normally or panicked, so `flush` never waits on a dead worker.
struct SettleOnExit(Arc<watch::Sender<u64>>);

impl Drop for SettleOnExit {
    fn drop(&mut self) {
        self.0.send_replace(u64::MAX);
    }
}

impl DrainWorker {
    async fn run(self) {
        let _exit = SettleOnExit(self.settled.clone());
        debug!("persistence drain worker started");
        while let Some(entries) = self.queue.recv_batch().await {
            let count = entries.len() as u64;
            if let Err(e) = self.drain_pass(&entries).await {
                warn!(error = %e, entries = count, "failed to persist log batch");
                self.console
                    .report_failure("Error writing logs to storage", &e);
            }
            self.settled.send_modify(|n| *n += count);

            if !self.queue.is_empty() && !self.queue.is_closed() {
                tokio::time::sleep(self.settings.redrain_delay).await;
            }
        }
        debug!("persistence drain worker stopped");
    }

    async fn drain_pass(&self, entries: &[LogEntry]) -> StoreResult<()> {
        let batch = build_batch(entries, self.clock.now(), self.settings.max_file_size);

        self.store.prepare().await?;
        self.store.write_batch(&batch).await?;
        debug!(
            entries = entries.len(),
            files = batch.appends.len(),
            "persisted log batch"
        );

        self.retention.sweep(self.store.as_ref()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Severity;
    use crate::domain::errors::StoreResult;
    use crate::domain::models::{EntryQuery, LogFileSummary, LogRecord};
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::logging::CapturedConsole;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    struct ExplodingStore;

    #[async_trait]
    impl LogStore for ExplodingStore {
        async fn prepare(&self) -> StoreResult<()> {
            Ok(())
        }

        async fn write_batch(&self, _batch: &WriteBatch) -> StoreResult<()> {
            panic!("store exploded");
        }

        async fn list_files(&self) -> StoreResult<Vec<LogFileSummary>> {
            Ok(Vec::new())
        }

        async fn get_file(&self, _name: &str) -> StoreResult<Option<LogFile>> {
            Ok(None)
        }

        async fn delete_file(&self, _name: &str) -> StoreResult<bool> {
            Ok(false)
        }

        async fn entry_dates(&self) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn delete_entries_except(&self, _keep: &[String]) -> StoreResult<u64> {
            Ok(0)
        }

        async fn query_entries(&self, _query: &EntryQuery) -> StoreResult<Vec<LogRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_flush_returns_after_worker_panic() {
        let console = ConsoleSink::new(Arc::new(CapturedConsole::new()), false, false);
        let sink = PersistenceSink::spawn(
            Arc::new(ExplodingStore),
            console,
            Arc::new(SystemClock::new()),
            PersistenceSettings::default(),
            &Handle::current(),
        );

        sink.persist(LogEntry::new(Severity::Error, "A", "first", None, Utc::now()));
        let first = tokio::time::timeout(Duration::from_secs(5), sink.flush()).await;
        assert!(first.is_ok());

        sink.persist(LogEntry::new(Severity::Error, "A", "second", None, Utc::now()));
        let second = tokio::time::timeout(Duration::from_secs(5), sink.flush()).await;
        assert!(second.is_ok());
        sink.shutdown().await;
    }

    #[test]
    fn test_build_batch_groups_by_entry_date() {
        let late = Utc.with_ymd_and_hms(2025, 4, 1, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2025, 4, 2, 0, 0, 1).unwrap();
        let entries = vec![
            LogEntry::new(Severity::Info, "A", "before midnight", None, late),
            LogEntry::new(Severity::Warn, "", "after midnight", Some(json!({"x": 1})), early),
            LogEntry::new(Severity::Info, "A", "still after", None, early),
        ];

        let batch = build_batch(&entries, early, 1024);
        assert_eq!(batch.appends.len(), 2);
        assert_eq!(batch.appends[0].name, "app_2025-04-01.log");
        assert_eq!(
            batch.appends[0].chunk,
            "[2025-04-01T23:59:59.000Z] [INFO] before midnight\n"
        );
        assert_eq!(
            batch.appends[1].chunk,
            "[2025-04-02T00:00:01.000Z] [WARN] after midnight | {\"x\":1}\n\
             [2025-04-02T00:00:01.000Z] [INFO] still after\n"
        );
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.records[1].source, "unknown");
        assert_eq!(batch.max_file_size, 1024);
    }
}
