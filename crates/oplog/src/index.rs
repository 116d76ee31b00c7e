//! Deterministic fold of an ordered log into a filesystem state
//!
//! The fold is strictly sequential: each entry is unsealed, decoded and
//! applied before the next one is looked at. No entry can abort the fold;
//! anything that cannot be applied is skipped and, optionally, recorded
//! in the [`FoldReport`].

use diagnostics::*;
use serde_json::Value;
use std::sync::Arc;
use tinyfs::{FsState, Op, Opcode, Outcome, ops};

use crate::crypter::{Crypter, unseal};
use crate::entry::LogEntry;
use crate::error::{OpLogError, Result};
use crate::log::OpLog;

/// Why an entry left the state unchanged
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("cannot decrypt: {0}")]
    Decrypt(String),

    #[error("cannot parse descriptor: {0}")]
    Parse(String),

    #[error("unknown opcode {0}")]
    UnknownOpcode(String),

    #[error("precondition failed: {0}")]
    Precondition(tinyfs::Error),
}

/// A skipped entry, or a skipped part of a `BATCH` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Skip {
    /// Zero-based position of the entry in the log
    pub position: usize,
    /// Indexes into the (possibly nested) batch payloads leading to the
    /// skipped sub-operation; empty when the whole entry was skipped
    pub within: Vec<usize>,
    pub reason: SkipReason,
}

/// Per-rebuild accounting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldReport {
    pub entries: usize,
    /// Entries that changed the state, fully or in part
    pub applied: usize,
    /// Entries that left the state unchanged
    pub skipped: usize,
    /// Every skip, including sub-operations of applied batches. Empty when
    /// skip recording is disabled; the counters are always kept.
    pub skips: Vec<Skip>,
}

/// A finished fold
#[derive(Debug, Clone, PartialEq)]
pub struct Rebuild {
    pub state: FsState,
    pub report: FoldReport,
}

/// Folds log entries one at a time into a private scratch state.
///
/// Nothing else can observe the state until [`IndexBuilder::finish`]
/// hands it out.
pub struct IndexBuilder {
    crypter: Option<Arc<dyn Crypter>>,
    record_skips: bool,
    state: FsState,
    report: FoldReport,
}

impl IndexBuilder {
    #[must_use]
    pub fn new(crypter: Option<Arc<dyn Crypter>>) -> Self {
        Self {
            crypter,
            record_skips: true,
            state: FsState::new(),
            report: FoldReport::default(),
        }
    }

    #[must_use]
    pub fn record_skips(mut self, record: bool) -> Self {
        self.record_skips = record;
        self
    }

    /// Number of entries processed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.report.entries
    }

    /// Processes the next entry. Returns whether it changed the state.
    pub async fn push(&mut self, entry: &LogEntry) -> bool {
        let position = self.report.entries;
        self.report.entries += 1;

        let mut skips = Vec::new();
        let applied = match unseal(&entry.payload, self.crypter.as_deref()).await {
            Ok(value) => match decode(value) {
                Ok(decoded) => replay(&mut self.state, &decoded, &mut Vec::new(), &mut skips),
                Err(reason) => {
                    skips.push((Vec::new(), reason));
                    false
                }
            },
            Err(OpLogError::Json(e)) => {
                skips.push((Vec::new(), SkipReason::Parse(e.to_string())));
                false
            }
            Err(e) => {
                skips.push((Vec::new(), SkipReason::Decrypt(e.to_string())));
                false
            }
        };

        if applied {
            self.report.applied += 1;
        } else {
            self.report.skipped += 1;
        }

        for (within, reason) in skips {
            if !matches!(reason, SkipReason::Precondition(_)) {
                let id = entry.id.as_str();
                let at = format!("{within:?}");
                let message = reason.to_string();
                warn!(
                    "Skipping log entry {position} ({id}) at {at}: {message}",
                    position: position,
                    id: id,
                    at: at,
                    message: message
                );
            }
            if self.record_skips {
                self.report.skips.push(Skip {
                    position,
                    within,
                    reason,
                });
            }
        }
        applied
    }

    #[must_use]
    pub fn finish(self) -> Rebuild {
        let entries = self.report.entries;
        let applied = self.report.applied;
        let skipped = self.report.skipped;
        let nodes = self.state.len();
        info!(
            "Rebuilt index: {entries} entries, {applied} applied, {skipped} skipped, {nodes} nodes",
            entries: entries,
            applied: applied,
            skipped: skipped,
            nodes: nodes
        );
        Rebuild {
            state: self.state,
            report: self.report,
        }
    }
}

/// A descriptor read at replay time
///
/// Batch payloads are decoded one by one, so a malformed sub-descriptor
/// is skipped on its own instead of taking its siblings with it.
enum Decoded {
    Op(Op),
    Batch(Vec<std::result::Result<Decoded, SkipReason>>),
}

/// Interprets a raw descriptor. An `op` naming no known operation is
/// reported separately from an otherwise malformed descriptor.
fn decode(value: Value) -> std::result::Result<Decoded, SkipReason> {
    let opcode = match value.get("op") {
        Some(Value::String(name)) => {
            Opcode::parse(name).ok_or_else(|| SkipReason::UnknownOpcode(name.clone()))?
        }
        Some(other) => return Err(SkipReason::UnknownOpcode(other.to_string())),
        None => return Err(SkipReason::Parse("missing op field".to_string())),
    };
    if opcode == Opcode::Batch {
        let Some(Value::Array(payloads)) = value.get("payloads") else {
            return Err(SkipReason::Parse("BATCH without a payloads array".to_string()));
        };
        return Ok(Decoded::Batch(payloads.iter().cloned().map(decode).collect()));
    }
    serde_json::from_value(value)
        .map(Decoded::Op)
        .map_err(|e| SkipReason::Parse(e.to_string()))
}

/// Applies a decoded descriptor, collecting every skip with the batch
/// indexes that lead to it. Returns whether the state changed.
///
/// A batch changes the state when any sub-operation does, or when it is
/// empty.
fn replay(
    state: &mut FsState,
    decoded: &Decoded,
    within: &mut Vec<usize>,
    skips: &mut Vec<(Vec<usize>, SkipReason)>,
) -> bool {
    match decoded {
        Decoded::Op(op) => match ops::apply(state, op) {
            Outcome::Skipped(err) => {
                skips.push((within.clone(), SkipReason::Precondition(err)));
                false
            }
            Outcome::Applied | Outcome::Partial(_) => true,
        },
        Decoded::Batch(items) => {
            let mut applied = items.is_empty();
            for (index, item) in items.iter().enumerate() {
                within.push(index);
                match item {
                    Ok(sub) => applied |= replay(state, sub, within, skips),
                    Err(reason) => skips.push((within.clone(), reason.clone())),
                }
                _ = within.pop();
            }
            applied
        }
    }
}

/// Folds `entries` in order, starting from the empty state.
pub async fn rebuild(entries: &[LogEntry], crypter: Option<Arc<dyn Crypter>>) -> Rebuild {
    let mut builder = IndexBuilder::new(crypter);
    for entry in entries {
        _ = builder.push(entry).await;
    }
    builder.finish()
}

/// Reads the whole log and folds it. Only reading the log can fail.
pub async fn rebuild_from(
    log: &dyn OpLog,
    crypter: Option<Arc<dyn Crypter>>,
    record_skips: bool,
) -> Result<Rebuild> {
    let entries = log.entries().await?;
    let mut builder = IndexBuilder::new(crypter).record_skips(record_skips);
    for entry in &entries {
        _ = builder.push(entry).await;
    }
    Ok(builder.finish())
}
