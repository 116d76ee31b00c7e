use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::entry::{LogEntry, Payload};
use crate::error::Result;

/// Append-only, totally ordered log of entries
///
/// Replication and ordering across peers belong to the implementation;
/// readers only rely on `entries()` returning the same order every time.
#[async_trait]
pub trait OpLog: Send + Sync {
    /// Appends a payload and returns the stored entry.
    async fn append(&self, payload: Payload) -> Result<LogEntry>;

    /// All entries in log order.
    async fn entries(&self) -> Result<Vec<LogEntry>>;

    async fn len(&self) -> Result<usize> {
        Ok(self.entries().await?.len())
    }
}

/// In-process log
///
/// Clones share the same entries, so several stores holding clones behave
/// like replicas observing one ordered log.
#[derive(Clone, Default)]
pub struct MemoryLog(Arc<Mutex<Vec<LogEntry>>>);

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self(Arc::new(Mutex::new(entries)))
    }

    /// Appends an already-built entry, as a transport delivering a remote
    /// peer's write would.
    pub async fn push(&self, entry: LogEntry) {
        self.0.lock().await.push(entry);
    }
}

#[async_trait]
impl OpLog for MemoryLog {
    async fn append(&self, payload: Payload) -> Result<LogEntry> {
        let entry = LogEntry::new(payload);
        self.0.lock().await.push(entry.clone());
        Ok(entry)
    }

    async fn entries(&self) -> Result<Vec<LogEntry>> {
        Ok(self.0.lock().await.clone())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.0.lock().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_log_preserves_order() {
        let log = MemoryLog::new();
        for i in 0..5 {
            _ = log.append(Payload::Plain(json!(i))).await.unwrap();
        }
        let values: Vec<_> = log
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.payload)
            .collect();
        assert_eq!(
            values,
            (0..5).map(|i| Payload::Plain(json!(i))).collect::<Vec<_>>()
        );
        assert_eq!(log.len().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let a = MemoryLog::new();
        let b = a.clone();
        _ = a.append(Payload::Plain(json!("x"))).await.unwrap();
        b.push(LogEntry::new(Payload::Plain(json!("y")))).await;
        assert_eq!(a.len().await.unwrap(), 2);
        assert_eq!(b.entries().await.unwrap(), a.entries().await.unwrap());
    }
}
