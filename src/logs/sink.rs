//! Search Log Sinks
//!
//! Where executed searches are recorded. Writing is best-effort from the
//! pipeline's point of view: a failing sink is logged and otherwise ignored.

use super::types::SearchLogRecord;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncWriteExt;

/// Records kept by `MemorySearchLog` before the oldest are dropped.
pub const MEMORY_LOG_CAPACITY: usize = 10_000;

pub type SinkFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub trait SearchLogSink: Send + Sync {
    fn record(&self, record: SearchLogRecord) -> SinkFuture<'_, ()>;

    /// Up to `limit` records, newest first.
    fn recent(&self, limit: usize) -> SinkFuture<'_, Vec<SearchLogRecord>>;
}

/// Bounded in-process ring of records.
pub struct MemorySearchLog {
    records: Mutex<VecDeque<SearchLogRecord>>,
    capacity: usize,
}

impl MemorySearchLog {
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySearchLog {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchLogSink for MemorySearchLog {
    fn record(&self, record: SearchLogRecord) -> SinkFuture<'_, ()> {
        let mut records = self.records.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
        Box::pin(async { Ok(()) })
    }

    fn recent(&self, limit: usize) -> SinkFuture<'_, Vec<SearchLogRecord>> {
        let recent: Vec<SearchLogRecord> = self
            .records
            .lock()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect();
        Box::pin(async move { Ok(recent) })
    }
}

/// Appends one JSON document per line to a file.
pub struct FileSearchLog {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSearchLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, record: SearchLogRecord) -> Result<()> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening search log {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_recent(&self, limit: usize) -> Result<Vec<SearchLogRecord>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading search log {}", self.path.display()));
            }
        };

        Ok(text
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed search log line: {}", e);
                    None
                }
            })
            .take(limit)
            .collect())
    }
}

impl SearchLogSink for FileSearchLog {
    fn record(&self, record: SearchLogRecord) -> SinkFuture<'_, ()> {
        Box::pin(self.append(record))
    }

    fn recent(&self, limit: usize) -> SinkFuture<'_, Vec<SearchLogRecord>> {
        Box::pin(self.read_recent(limit))
    }
}
