//! The operation set: total transitions over [`FsState`]
//!
//! Every function checks its preconditions with [`crate::check`] first. A
//! failed precondition leaves the state untouched and is reported as
//! [`Outcome::Skipped`]; nothing here returns an error or panics, so a
//! replay can always continue with the next entry.

use diagnostics::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::check;
use crate::error::Error;
use crate::fs::FsState;
use crate::node::Node;
use crate::path;

/// Operation identifiers as they appear in the `op` field of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    Mkdir,
    Rmdir,
    Mvdir,
    Cpdir,
    Mk,
    Write,
    Rm,
    Mv,
    Cp,
    Batch,
}

impl Opcode {
    pub const ALL: [Opcode; 10] = [
        Opcode::Mkdir,
        Opcode::Rmdir,
        Opcode::Mvdir,
        Opcode::Cpdir,
        Opcode::Mk,
        Opcode::Write,
        Opcode::Rm,
        Opcode::Mv,
        Opcode::Cp,
        Opcode::Batch,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Mkdir => "MKDIR",
            Opcode::Rmdir => "RMDIR",
            Opcode::Mvdir => "MVDIR",
            Opcode::Cpdir => "CPDIR",
            Opcode::Mk => "MK",
            Opcode::Write => "WRITE",
            Opcode::Rm => "RM",
            Opcode::Mv => "MV",
            Opcode::Cp => "CP",
            Opcode::Batch => "BATCH",
        }
    }

    /// Looks up an opcode by its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Opcode> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured operation descriptor, the plaintext form of a log entry
///
/// Wire form is JSON tagged by `op`, e.g.
/// `{"op":"MV","path":"/r/a","dest":"/r/dir","name":"b"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "UPPERCASE")]
pub enum Op {
    Mkdir {
        path: String,
        name: String,
    },
    Rmdir {
        path: String,
    },
    Mvdir {
        path: String,
        dest: String,
        name: String,
    },
    Cpdir {
        path: String,
        dest: String,
        name: String,
    },
    Mk {
        path: String,
        name: String,
    },
    Write {
        path: String,
        #[serde(default, alias = "json")]
        content: Value,
    },
    Rm {
        path: String,
    },
    Mv {
        path: String,
        dest: String,
        name: String,
    },
    Cp {
        path: String,
        dest: String,
        name: String,
    },
    Batch {
        payloads: Vec<Op>,
    },
}

impl Op {
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Op::Mkdir { .. } => Opcode::Mkdir,
            Op::Rmdir { .. } => Opcode::Rmdir,
            Op::Mvdir { .. } => Opcode::Mvdir,
            Op::Cpdir { .. } => Opcode::Cpdir,
            Op::Mk { .. } => Opcode::Mk,
            Op::Write { .. } => Opcode::Write,
            Op::Rm { .. } => Opcode::Rm,
            Op::Mv { .. } => Opcode::Mv,
            Op::Cp { .. } => Opcode::Cp,
            Op::Batch { .. } => Opcode::Batch,
        }
    }

    /// Strict precondition check against `state`, without applying.
    ///
    /// A batch is checked by simulating its sub-operations in order on a
    /// scratch copy, so later sub-operations see the effects of earlier ones.
    pub fn check(&self, state: &FsState) -> crate::Result<()> {
        match self {
            Op::Mkdir { path, name } => check::mkdir(state, path, name).map(drop),
            Op::Rmdir { path } => check::rmdir(state, path),
            Op::Mvdir { path, dest, name } => check::mvdir(state, path, dest, name).map(drop),
            Op::Cpdir { path, dest, name } => check::cpdir(state, path, dest, name).map(drop),
            Op::Mk { path, name } => check::mk(state, path, name).map(drop),
            Op::Write { path, .. } => check::write(state, path),
            Op::Rm { path } => check::rm(state, path),
            Op::Mv { path, dest, name } => check::mv(state, path, dest, name).map(drop),
            Op::Cp { path, dest, name } => check::cp(state, path, dest, name).map(drop),
            Op::Batch { payloads } => simulate(state, payloads)
                .map(drop)
                .map_err(|(_, err)| err),
        }
    }
}

/// Result of applying one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// State unchanged; carries the first violated precondition
    Skipped(Error),
    /// A batch where some sub-operations applied and others were skipped;
    /// one outcome per sub-operation
    Partial(Vec<Outcome>),
}

impl Outcome {
    /// True when the state changed, fully or in part.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied | Outcome::Partial(_))
    }

    fn from_check<T>(result: crate::Result<T>, effect: impl FnOnce(T)) -> Self {
        match result {
            Ok(value) => {
                effect(value);
                Outcome::Applied
            }
            Err(err) => Outcome::Skipped(err),
        }
    }
}

/// Creates a directory at `join(path, name)`.
pub fn mkdir(state: &mut FsState, path: &str, name: &str) -> Outcome {
    let checked = check::mkdir(state, path, name);
    Outcome::from_check(checked, |target| state.insert(target, Node::Directory))
}

/// Removes the directory at `path` and everything under it.
pub fn rmdir(state: &mut FsState, path: &str) -> Outcome {
    let checked = check::rmdir(state, path);
    Outcome::from_check(checked, |()| {
        for p in state.tree(path) {
            _ = state.remove(&p);
        }
        _ = state.remove(path);
    })
}

/// Re-keys `path` and its subtree under `join(dest, name)`.
pub fn mvdir(state: &mut FsState, path: &str, dest: &str, name: &str) -> Outcome {
    let checked = check::mvdir(state, path, dest, name);
    Outcome::from_check(checked, |target| relocate(state, path, &target, true))
}

/// Duplicates `path` and its subtree under `join(dest, name)`.
pub fn cpdir(state: &mut FsState, path: &str, dest: &str, name: &str) -> Outcome {
    let checked = check::cpdir(state, path, dest, name);
    Outcome::from_check(checked, |target| relocate(state, path, &target, false))
}

/// Creates an empty file at `join(path, name)`.
pub fn mk(state: &mut FsState, path: &str, name: &str) -> Outcome {
    let checked = check::mk(state, path, name);
    Outcome::from_check(checked, |target| state.insert(target, Node::empty_file()))
}

/// Replaces the content of the file at `path`.
pub fn write(state: &mut FsState, path: &str, content: Value) -> Outcome {
    let checked = check::write(state, path);
    Outcome::from_check(checked, |()| {
        if let Some(node) = state.get_mut(path) {
            *node = Node::file(content);
        }
    })
}

/// Removes the file at `path`.
pub fn rm(state: &mut FsState, path: &str) -> Outcome {
    let checked = check::rm(state, path);
    Outcome::from_check(checked, |()| {
        _ = state.remove(path);
    })
}

/// Moves the file at `path` to `join(dest, name)`.
pub fn mv(state: &mut FsState, path: &str, dest: &str, name: &str) -> Outcome {
    let checked = check::mv(state, path, dest, name);
    Outcome::from_check(checked, |target| {
        if let Some(node) = state.remove(path) {
            state.insert(target, node);
        }
    })
}

/// Copies the file at `path` to `join(dest, name)`.
pub fn cp(state: &mut FsState, path: &str, dest: &str, name: &str) -> Outcome {
    let checked = check::cp(state, path, dest, name);
    Outcome::from_check(checked, |target| {
        if let Some(node) = state.get(path).cloned() {
            state.insert(target, node);
        }
    })
}

/// Checks `ops` in order, each against the state left by the ones before.
///
/// Returns the resulting state, or the index and reason of the first
/// operation that would be skipped. `state` itself is not touched.
pub fn simulate(state: &FsState, ops: &[Op]) -> std::result::Result<FsState, (usize, Error)> {
    let mut scratch = state.clone();
    for (index, op) in ops.iter().enumerate() {
        op.check(&scratch).map_err(|err| (index, err))?;
        _ = apply(&mut scratch, op);
    }
    Ok(scratch)
}

/// Applies each operation in order. There is no atomicity across the
/// batch: a skipped operation does not stop the ones after it.
pub fn batch(state: &mut FsState, ops: &[Op]) -> Vec<Outcome> {
    ops.iter().map(|op| apply(state, op)).collect()
}

/// Dispatches a descriptor to its operation.
///
/// A batch is `Applied` when every sub-operation applied (or it is empty),
/// `Partial` when only some did, and otherwise reports the first skip.
pub fn apply(state: &mut FsState, op: &Op) -> Outcome {
    let outcome = match op {
        Op::Mkdir { path, name } => mkdir(state, path, name),
        Op::Rmdir { path } => rmdir(state, path),
        Op::Mvdir { path, dest, name } => mvdir(state, path, dest, name),
        Op::Cpdir { path, dest, name } => cpdir(state, path, dest, name),
        Op::Mk { path, name } => mk(state, path, name),
        Op::Write { path, content } => write(state, path, content.clone()),
        Op::Rm { path } => rm(state, path),
        Op::Mv { path, dest, name } => mv(state, path, dest, name),
        Op::Cp { path, dest, name } => cp(state, path, dest, name),
        Op::Batch { payloads } => {
            let outcomes = batch(state, payloads);
            if outcomes.iter().all(|o| *o == Outcome::Applied) {
                Outcome::Applied
            } else if outcomes.iter().any(Outcome::is_applied) {
                Outcome::Partial(outcomes)
            } else {
                outcomes
                    .into_iter()
                    .next()
                    .unwrap_or(Outcome::Applied)
            }
        }
    };
    if let Outcome::Skipped(reason) = &outcome {
        let opcode = op.opcode().as_str();
        let reason = reason.to_string();
        debug!("Skipped {opcode}: {reason}", opcode: opcode, reason: reason);
    }
    outcome
}

/// Moves or copies `path` and its subtree to `target`.
fn relocate(state: &mut FsState, path: &str, target: &str, remove_source: bool) {
    let mut paths = vec![path.to_string()];
    paths.extend(state.tree(path));
    let moved: Vec<(String, Node)> = paths
        .iter()
        .filter_map(|p| state.get(p).map(|node| (path::rebase(p, path, target), node.clone())))
        .collect();
    if remove_source {
        for p in &paths {
            _ = state.remove(p);
        }
    }
    for (p, node) in moved {
        state.insert(p, node);
    }
}
