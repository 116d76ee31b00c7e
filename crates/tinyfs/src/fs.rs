use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::EntryType;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::path::{self, ROOT};

/// Filesystem state: a mapping from absolute path to node
///
/// The root directory is always present. Keys are kept in a `BTreeMap` so
/// that two states holding the same mapping serialize and hash identically;
/// listing order is computed by [`path::listing_order`], not taken from the
/// map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Node>", into = "BTreeMap<String, Node>")]
pub struct FsState {
    nodes: BTreeMap<String, Node>,
}

impl Default for FsState {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<String, Node>> for FsState {
    fn from(mut nodes: BTreeMap<String, Node>) -> Self {
        _ = nodes.insert(ROOT.to_string(), Node::Directory);
        Self { nodes }
    }
}

impl From<FsState> for BTreeMap<String, Node> {
    fn from(state: FsState) -> Self {
        state.nodes
    }
}

impl FsState {
    /// Canonical empty state: the root directory only
    #[must_use]
    pub fn new() -> Self {
        Self::from(BTreeMap::new())
    }

    /// Seeds a state from existing entries. The root is always forced to be
    /// a directory; no other invariant is checked (see [`Self::check_invariants`]).
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Node)>,
        S: Into<String>,
    {
        Self::from(
            entries
                .into_iter()
                .map(|(p, n)| (p.into(), n))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    /// Drops everything except the root.
    pub fn reset(&mut self) {
        self.nodes.clear();
        _ = self.nodes.insert(ROOT.to_string(), Node::Directory);
    }

    #[must_use]
    pub fn root(&self) -> &'static str {
        ROOT
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true; the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Node> {
        self.nodes.get(path)
    }

    /// Kind of the node at `path`, if any
    #[must_use]
    pub fn content_kind(&self, path: &str) -> Option<EntryType> {
        self.nodes.get(path).map(Node::entry_type)
    }

    #[must_use]
    pub fn is_dir(&self, path: &str) -> bool {
        self.nodes.get(path).is_some_and(Node::is_dir)
    }

    #[must_use]
    pub fn is_file(&self, path: &str) -> bool {
        self.nodes.get(path).is_some_and(Node::is_file)
    }

    /// Content of the file at `path`; `None` for directories and missing paths
    #[must_use]
    pub fn read(&self, path: &str) -> Option<&Value> {
        self.nodes.get(path).and_then(Node::content)
    }

    /// Every path strictly nested under `path`, in listing order
    #[must_use]
    pub fn tree(&self, path: &str) -> Vec<String> {
        let mut paths: Vec<String> = self.subtree_keys(path).cloned().collect();
        path::sort_listing(&mut paths);
        paths
    }

    /// Immediate children of `path`, in listing order
    #[must_use]
    pub fn ls(&self, path: &str) -> Vec<String> {
        let depth = path::depth(path) + 1;
        let mut paths: Vec<String> = self
            .subtree_keys(path)
            .filter(|p| path::depth(p) == depth)
            .cloned()
            .collect();
        path::sort_listing(&mut paths);
        paths
    }

    /// All `(path, node)` pairs in key order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(p, n)| (p.as_str(), n))
    }

    /// SHA-256 over the canonical JSON form. Replicas that converged have
    /// equal fingerprints.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let mut hasher = Sha256::new();
        serde_json::to_writer(&mut hasher, &self.nodes)?;
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Verifies the tree invariants, returning the first violation.
    pub fn check_invariants(&self) -> Result<()> {
        match self.nodes.get(ROOT) {
            Some(Node::Directory) => {}
            Some(_) => return Err(Error::not_a_directory(ROOT)),
            None => return Err(Error::not_found(ROOT)),
        }
        for p in self.nodes.keys() {
            if p == ROOT {
                continue;
            }
            if !path::path_valid(p) {
                return Err(Error::path_invalid(p));
            }
            let parent = path::parent_of(p)?.ok_or_else(|| Error::path_invalid(p))?;
            match self.nodes.get(parent) {
                Some(Node::Directory) => {}
                Some(_) => return Err(Error::not_a_directory(parent)),
                None => return Err(Error::not_found(parent)),
            }
        }
        Ok(())
    }

    /// Keys strictly nested under `path`, in byte order.
    ///
    /// Nested keys share the prefix `path + "/"`, and `'0'` is the byte after
    /// `'/'`, so the range covers them exactly.
    fn subtree_keys<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a String> + 'a {
        let start = format!("{path}/");
        let end = format!("{path}0");
        self.nodes.range(start..end).map(|(p, _)| p)
    }

    pub(crate) fn insert(&mut self, path: String, node: Node) {
        _ = self.nodes.insert(path, node);
    }

    pub(crate) fn remove(&mut self, path: &str) -> Option<Node> {
        if path == ROOT {
            return None;
        }
        self.nodes.remove(path)
    }

    pub(crate) fn get_mut(&mut self, path: &str) -> Option<&mut Node> {
        self.nodes.get_mut(path)
    }
}
