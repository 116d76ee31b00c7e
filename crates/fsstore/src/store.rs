//! FsStore - read and write surface over one operation log
//!
//! Reads are answered from an immutable snapshot of the folded index.
//! Writes are checked against that snapshot, sealed, and appended; the
//! index is then folded again from the whole log and swapped in.

use diagnostics::*;
use oplog::{Crypter, FoldReport, LogEntry, OpLog, rebuild_from, seal};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tinyfs::{EntryType, FsState, Op, ops};

use crate::batch::Batch;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

pub struct FsStore {
    log: Arc<dyn OpLog>,
    crypter: Option<Arc<dyn Crypter>>,
    config: StoreConfig,
    index: RwLock<Arc<FsState>>,
    report: RwLock<Arc<FoldReport>>,
    /// One fold at a time, so an older fold never replaces a newer one
    refresh: tokio::sync::Mutex<()>,
}

impl FsStore {
    /// Opens a store over `log` and folds it once.
    pub async fn open(
        log: Arc<dyn OpLog>,
        crypter: Option<Arc<dyn Crypter>>,
        config: StoreConfig,
    ) -> Result<Self> {
        let store = Self {
            log,
            crypter,
            config,
            index: RwLock::new(Arc::new(FsState::new())),
            report: RwLock::new(Arc::new(FoldReport::default())),
            refresh: tokio::sync::Mutex::new(()),
        };
        store.update_index().await?;
        Ok(store)
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.crypter.is_some()
    }

    /// Re-folds the whole log into a fresh state and swaps it in.
    ///
    /// Readers keep seeing the previous snapshot until the fold is done.
    pub async fn update_index(&self) -> Result<()> {
        let _guard = self.refresh.lock().await;
        let rebuild = rebuild_from(
            self.log.as_ref(),
            self.crypter.clone(),
            self.config.record_skips,
        )
        .await?;

        if self.config.verify_invariants {
            if let Err(e) = rebuild.state.check_invariants() {
                let violation = e.to_string();
                error!("Rebuilt index violates tree invariants: {violation}", violation: violation);
            }
        }

        *self.index.write() = Arc::new(rebuild.state);
        *self.report.write() = Arc::new(rebuild.report);
        Ok(())
    }

    /// The current index snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<FsState> {
        self.index.read().clone()
    }

    /// Accounting from the most recent fold
    #[must_use]
    pub fn last_report(&self) -> Arc<FoldReport> {
        self.report.read().clone()
    }

    #[must_use]
    pub fn root(&self) -> &'static str {
        tinyfs::ROOT
    }

    pub fn join_path(&self, path: &str, name: &str) -> Result<String> {
        Ok(tinyfs::path::join(path, name)?)
    }

    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.snapshot().exists(path)
    }

    /// Kind of entry at `path`, if any
    #[must_use]
    pub fn content(&self, path: &str) -> Option<EntryType> {
        self.snapshot().content_kind(path)
    }

    /// File content at `path`; `None` for directories and missing paths.
    #[must_use]
    pub fn read(&self, path: &str) -> Option<Value> {
        self.snapshot().read(path).cloned()
    }

    #[must_use]
    pub fn tree(&self, path: &str) -> Vec<String> {
        self.snapshot().tree(path)
    }

    #[must_use]
    pub fn ls(&self, path: &str) -> Vec<String> {
        self.snapshot().ls(path)
    }

    pub async fn mkdir(&self, path: &str, name: &str) -> Result<LogEntry> {
        self.submit(Op::Mkdir {
            path: path.to_string(),
            name: name.to_string(),
        })
        .await
    }

    pub async fn rmdir(&self, path: &str) -> Result<LogEntry> {
        self.submit(Op::Rmdir {
            path: path.to_string(),
        })
        .await
    }

    pub async fn mvdir(&self, path: &str, dest: &str, name: &str) -> Result<LogEntry> {
        self.submit(Op::Mvdir {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        })
        .await
    }

    pub async fn cpdir(&self, path: &str, dest: &str, name: &str) -> Result<LogEntry> {
        self.submit(Op::Cpdir {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        })
        .await
    }

    pub async fn mk(&self, path: &str, name: &str) -> Result<LogEntry> {
        self.submit(Op::Mk {
            path: path.to_string(),
            name: name.to_string(),
        })
        .await
    }

    pub async fn write(&self, path: &str, content: Value) -> Result<LogEntry> {
        self.submit(Op::Write {
            path: path.to_string(),
            content,
        })
        .await
    }

    pub async fn rm(&self, path: &str) -> Result<LogEntry> {
        self.submit(Op::Rm {
            path: path.to_string(),
        })
        .await
    }

    pub async fn mv(&self, path: &str, dest: &str, name: &str) -> Result<LogEntry> {
        self.submit(Op::Mv {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        })
        .await
    }

    pub async fn cp(&self, path: &str, dest: &str, name: &str) -> Result<LogEntry> {
        self.submit(Op::Cp {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        })
        .await
    }

    /// Starts a batch that is appended as a single `BATCH` entry.
    #[must_use]
    pub fn batch(&self) -> Batch<'_> {
        Batch::new(self)
    }

    /// Validates and appends a batch of operations.
    ///
    /// The operations are simulated in order on a copy of the snapshot;
    /// the first one that would be skipped rejects the whole batch.
    pub(crate) async fn submit_batch(&self, payloads: Vec<Op>) -> Result<LogEntry> {
        if payloads.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        if let Err((index, source)) = ops::simulate(&self.snapshot(), &payloads) {
            let reason = source.to_string();
            debug!("Rejected batch at {index}: {reason}", index: index, reason: reason);
            return Err(StoreError::Batch { index, source });
        }

        self.append(Op::Batch { payloads }).await
    }

    async fn submit(&self, op: Op) -> Result<LogEntry> {
        if let Err(e) = op.check(&self.snapshot()) {
            let opcode = op.opcode().as_str();
            let reason = e.to_string();
            debug!("Rejected {opcode}: {reason}", opcode: opcode, reason: reason);
            return Err(e.into());
        }
        self.append(op).await
    }

    async fn append(&self, op: Op) -> Result<LogEntry> {
        let payload = seal(&op, self.crypter.as_deref()).await?;
        let entry = self.log.append(payload).await?;

        let opcode = op.opcode().as_str();
        let id = entry.id.as_str();
        debug!("Appended {opcode} as {id}", opcode: opcode, id: id);

        if self.config.refresh_on_write {
            self.update_index().await?;
        }
        Ok(entry)
    }
}
