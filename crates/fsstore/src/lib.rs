//! FsStore - a path-addressed filesystem kept in an operation log
//!
//! Every change is an entry in an append-only log, optionally encrypted.
//! The filesystem seen by readers is the deterministic fold of that log,
//! so any replica holding the same ordered entries sees the same tree.
//!
//! ```no_run
//! # async fn demo() -> fsstore::Result<()> {
//! use std::sync::Arc;
//! use fsstore::{FsStore, MemoryLog, StoreConfig};
//!
//! let store = FsStore::open(Arc::new(MemoryLog::new()), None, StoreConfig::default()).await?;
//! store.mkdir("/r", "docs").await?;
//! store.mk("/r/docs", "notes").await?;
//! store.write("/r/docs/notes", serde_json::json!({"text": "hi"})).await?;
//! assert_eq!(store.ls("/r"), vec!["/r/docs"]);
//! # Ok(())
//! # }
//! ```

mod batch;
mod config;
mod error;
mod store;

pub use batch::Batch;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use store::FsStore;

pub use oplog::{
    Crypter, Envelope, FileLog, FoldReport, LogEntry, MemoryLog, OpLog, OpLogError, Payload, Skip,
    SkipReason,
};
pub use tinyfs::{EntryType, Error as ValidationError, FsState, Op, Opcode, ROOT};
