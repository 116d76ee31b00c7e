//! Append-only operation log and the index fold over it
//!
//! A log is an ordered sequence of [`LogEntry`] values whose payloads are
//! operation descriptors, either plain JSON or sealed by a [`Crypter`].
//! [`rebuild`] folds a log from the empty state; two replicas that see the
//! same entries in the same order end up with identical states.

mod crypter;
mod entry;
mod error;
mod file_log;
mod index;
mod log;


pub use crypter::{Crypter, seal, unseal};
pub use entry::{Envelope, LogEntry, Payload};
pub use error::{OpLogError, Result};
pub use file_log::FileLog;
pub use index::{FoldReport, IndexBuilder, Rebuild, Skip, SkipReason, rebuild, rebuild_from};
pub use log::{MemoryLog, OpLog};
