use crate::EntryType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node stored at a path: a directory, or a file with structured content
///
/// Serialized as `{"type":"dir"}` or `{"type":"file","content":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "dir")]
    Directory,
    #[serde(rename = "file")]
    File {
        /// `Value::Null` until the first write
        #[serde(default)]
        content: Value,
    },
}

impl Node {
    /// A file with empty content
    #[must_use]
    pub fn empty_file() -> Self {
        Node::File {
            content: Value::Null,
        }
    }

    #[must_use]
    pub fn file(content: Value) -> Self {
        Node::File { content }
    }

    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        match self {
            Node::Directory => EntryType::Directory,
            Node::File { .. } => EntryType::File,
        }
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory)
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Node::File { .. })
    }

    /// File content, or `None` for directories
    #[must_use]
    pub fn content(&self) -> Option<&Value> {
        match self {
            Node::File { content } => Some(content),
            Node::Directory => None,
        }
    }
}
