use serde_json::Value;
use tinyfs::Op;

use crate::error::Result;
use crate::store::FsStore;
use oplog::LogEntry;

/// Accumulates operations for one `BATCH` log entry
///
/// Nothing is checked or appended until [`Batch::execute`].
pub struct Batch<'a> {
    store: &'a FsStore,
    payloads: Vec<Op>,
}

impl<'a> Batch<'a> {
    pub(crate) fn new(store: &'a FsStore) -> Self {
        Self {
            store,
            payloads: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// The operations queued so far
    #[must_use]
    pub fn payloads(&self) -> &[Op] {
        &self.payloads
    }

    #[must_use]
    pub fn mkdir(mut self, path: &str, name: &str) -> Self {
        self.payloads.push(Op::Mkdir {
            path: path.to_string(),
            name: name.to_string(),
        });
        self
    }

    #[must_use]
    pub fn rmdir(mut self, path: &str) -> Self {
        self.payloads.push(Op::Rmdir {
            path: path.to_string(),
        });
        self
    }

    #[must_use]
    pub fn mvdir(mut self, path: &str, dest: &str, name: &str) -> Self {
        self.payloads.push(Op::Mvdir {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        });
        self
    }

    #[must_use]
    pub fn cpdir(mut self, path: &str, dest: &str, name: &str) -> Self {
        self.payloads.push(Op::Cpdir {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        });
        self
    }

    #[must_use]
    pub fn mk(mut self, path: &str, name: &str) -> Self {
        self.payloads.push(Op::Mk {
            path: path.to_string(),
            name: name.to_string(),
        });
        self
    }

    #[must_use]
    pub fn write(mut self, path: &str, content: Value) -> Self {
        self.payloads.push(Op::Write {
            path: path.to_string(),
            content,
        });
        self
    }

    #[must_use]
    pub fn rm(mut self, path: &str) -> Self {
        self.payloads.push(Op::Rm {
            path: path.to_string(),
        });
        self
    }

    #[must_use]
    pub fn mv(mut self, path: &str, dest: &str, name: &str) -> Self {
        self.payloads.push(Op::Mv {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        });
        self
    }

    #[must_use]
    pub fn cp(mut self, path: &str, dest: &str, name: &str) -> Self {
        self.payloads.push(Op::Cp {
            path: path.to_string(),
            dest: dest.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Validates the whole batch against the current snapshot and appends
    /// it as one entry.
    pub async fn execute(self) -> Result<LogEntry> {
        self.store.submit_batch(self.payloads).await
    }
}
