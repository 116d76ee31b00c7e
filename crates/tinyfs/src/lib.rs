//! TinyFS - a path-addressed filesystem state with total mutation operations
//!
//! The state maps absolute paths (`/r/dir/file`) to directories and files
//! holding JSON content. Operations never fail: a violated precondition
//! leaves the state as it was, which is what lets a log of operations be
//! replayed deterministically on any replica.

pub mod check;
mod entry_type;
mod error;
mod fs;
mod node;
pub mod ops;
pub mod path;

#[cfg(test)]
mod tests;

pub use entry_type::EntryType;
pub use error::{Error, Result};
pub use fs::FsState;
pub use node::Node;
pub use ops::{Op, Opcode, Outcome};
pub use path::ROOT;
