//! JSON-lines log file
//!
//! One [`LogEntry`] per line, appended and synced before `append` returns.
//! Reopening the file and folding it again reproduces the same state, so
//! recovery after a crash is a plain replay.

use async_trait::async_trait;
use diagnostics::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::entry::{LogEntry, Payload};
use crate::error::{OpLogError, Result};
use crate::log::OpLog;

pub struct FileLog {
    path: PathBuf,
    /// Serializes appends from this process
    write_lock: Mutex<()>,
}

impl FileLog {
    /// Opens (without creating) the log at `path`. A missing file reads as
    /// an empty log and is created on first append.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                return Err(OpLogError::LogFile {
                    path,
                    message: "is a directory".to_string(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let display = path.display().to_string();
        debug!("Opened log file {display}", display: display);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append_entry(&self, entry: &LogEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// Decodes one line. A line that is not a valid entry still occupies its
/// position in the log: it is carried as a plain string payload, which the
/// index fold skips as unparseable.
fn decode_line(number: usize, line: &str) -> LogEntry {
    match serde_json::from_str::<LogEntry>(line) {
        Ok(entry) => entry,
        Err(e) => {
            let reason = e.to_string();
            warn!("Log line {number} is not a log entry: {reason}", number: number, reason: reason);
            LogEntry {
                id: format!("line-{number}"),
                payload: Payload::Plain(Value::String(line.to_string())),
            }
        }
    }
}

#[async_trait]
impl OpLog for FileLog {
    async fn append(&self, payload: Payload) -> Result<LogEntry> {
        let entry = LogEntry::new(payload);
        self.append_entry(&entry).await?;
        Ok(entry)
    }

    async fn entries(&self) -> Result<Vec<LogEntry>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| decode_line(idx + 1, line))
            .collect())
    }
}
