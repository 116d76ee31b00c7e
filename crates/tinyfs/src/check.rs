//! Precondition checks shared by the write side and by replay
//!
//! Each function returns the first violated precondition of one operation,
//! checked in a fixed order: path shape, name shape, source existence and
//! kind, destination existence and kind, target non-existence, cycle.
//! Callers that append to the log surface the error; the operations in
//! [`crate::ops`] turn it into a skip.

use crate::error::{Error, Result};
use crate::fs::FsState;
use crate::path::{self, ROOT};

fn valid_path(path: &str) -> Result<()> {
    if path::path_valid(path) {
        Ok(())
    } else {
        Err(Error::path_invalid(path))
    }
}

fn valid_name(name: &str) -> Result<()> {
    if path::name_valid(name) {
        Ok(())
    } else {
        Err(Error::name_invalid(name))
    }
}

/// `path` must exist and be a directory.
pub fn is_directory(state: &FsState, path: &str) -> Result<()> {
    valid_path(path)?;
    match state.get(path) {
        Some(node) if node.is_dir() => Ok(()),
        Some(_) => Err(Error::not_a_directory(path)),
        None => Err(Error::not_found(path)),
    }
}

/// `path` must exist and be a file.
pub fn is_file(state: &FsState, path: &str) -> Result<()> {
    valid_path(path)?;
    match state.get(path) {
        Some(node) if node.is_file() => Ok(()),
        Some(_) => Err(Error::not_a_file(path)),
        None => Err(Error::not_found(path)),
    }
}

/// `join(dest, name)` must not exist; returns it.
fn vacant(state: &FsState, dest: &str, name: &str) -> Result<String> {
    let target = path::join(dest, name)?;
    if state.exists(&target) {
        return Err(Error::already_exists(target));
    }
    Ok(target)
}

/// Creation of a new entry `name` inside directory `path`; returns the new path.
pub fn create(state: &FsState, path: &str, name: &str) -> Result<String> {
    valid_path(path)?;
    valid_name(name)?;
    is_directory(state, path)?;
    vacant(state, path, name)
}

pub fn mkdir(state: &FsState, path: &str, name: &str) -> Result<String> {
    create(state, path, name)
}

pub fn mk(state: &FsState, path: &str, name: &str) -> Result<String> {
    create(state, path, name)
}

pub fn rmdir(state: &FsState, path: &str) -> Result<()> {
    is_directory(state, path)?;
    if path == ROOT {
        return Err(Error::immutable(path));
    }
    Ok(())
}

/// Shared by mvdir and cpdir; returns the new path of `path`.
fn relocate_dir(state: &FsState, path: &str, dest: &str, name: &str) -> Result<String> {
    valid_path(path)?;
    valid_path(dest)?;
    valid_name(name)?;
    is_directory(state, path)?;
    is_directory(state, dest)?;
    let target = vacant(state, dest, name)?;
    // The source subtree, including the source itself, must not contain dest.
    if dest == path || path::is_nested(path, dest) {
        return Err(Error::cycle(path, dest));
    }
    Ok(target)
}

pub fn mvdir(state: &FsState, path: &str, dest: &str, name: &str) -> Result<String> {
    if path == ROOT {
        return Err(Error::immutable(path));
    }
    relocate_dir(state, path, dest, name)
}

pub fn cpdir(state: &FsState, path: &str, dest: &str, name: &str) -> Result<String> {
    relocate_dir(state, path, dest, name)
}

pub fn write(state: &FsState, path: &str) -> Result<()> {
    is_file(state, path)
}

pub fn rm(state: &FsState, path: &str) -> Result<()> {
    is_file(state, path)
}

/// Shared by mv and cp; returns the new path of the file.
fn relocate_file(state: &FsState, path: &str, dest: &str, name: &str) -> Result<String> {
    valid_path(path)?;
    valid_path(dest)?;
    valid_name(name)?;
    is_file(state, path)?;
    is_directory(state, dest)?;
    vacant(state, dest, name)
}

pub fn mv(state: &FsState, path: &str, dest: &str, name: &str) -> Result<String> {
    relocate_file(state, path, dest, name)
}

pub fn cp(state: &FsState, path: &str, dest: &str, name: &str) -> Result<String> {
    relocate_file(state, path, dest, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn state() -> FsState {
        FsState::from_entries([
            ("/r/dir1", Node::Directory),
            ("/r/dir1/dir3", Node::Directory),
            ("/r/file1", Node::empty_file()),
        ])
    }

    #[test]
    fn test_create_checks_in_order() {
        let s = state();
        assert_eq!(mkdir(&s, "r", "x"), Err(Error::path_invalid("r")));
        assert_eq!(mkdir(&s, "/r", "a b"), Err(Error::name_invalid("a b")));
        assert_eq!(mkdir(&s, "/r/nope", "x"), Err(Error::not_found("/r/nope")));
        assert_eq!(mkdir(&s, "/r/file1", "x"), Err(Error::not_a_directory("/r/file1")));
        assert_eq!(mkdir(&s, "/r", "dir1"), Err(Error::already_exists("/r/dir1")));
        assert_eq!(mk(&s, "/r", "file1"), Err(Error::already_exists("/r/file1")));
        assert_eq!(mk(&s, "/r/dir1", "file2"), Ok("/r/dir1/file2".to_string()));
    }

    #[test]
    fn test_root_is_immutable() {
        let s = state();
        assert_eq!(rmdir(&s, ROOT), Err(Error::immutable(ROOT)));
        assert_eq!(mvdir(&s, ROOT, "/r/dir1", "moved"), Err(Error::immutable(ROOT)));
        assert_eq!(cpdir(&s, ROOT, "/r/dir1", "copy"), Err(Error::cycle(ROOT, "/r/dir1")));
        assert_eq!(rmdir(&s, "/r/file1"), Err(Error::not_a_directory("/r/file1")));
        assert_eq!(rmdir(&s, "/r/dir1"), Ok(()));
    }

    #[test]
    fn test_relocate_dir_cycle() {
        let s = state();
        assert_eq!(
            mvdir(&s, "/r/dir1", "/r/dir1", "x"),
            Err(Error::cycle("/r/dir1", "/r/dir1"))
        );
        assert_eq!(
            cpdir(&s, "/r/dir1", "/r/dir1/dir3", "x"),
            Err(Error::cycle("/r/dir1", "/r/dir1/dir3"))
        );
        assert_eq!(
            mvdir(&s, "/r/dir1/dir3", "/r", "dir3"),
            Ok("/r/dir3".to_string())
        );
    }

    #[test]
    fn test_relocate_file_kinds() {
        let s = state();
        assert_eq!(
            mv(&s, "/r/file1", "/r/file1", "x"),
            Err(Error::not_a_directory("/r/file1"))
        );
        assert_eq!(
            cp(&s, "/r/dir1", "/r", "x"),
            Err(Error::not_a_file("/r/dir1"))
        );
        assert_eq!(
            mv(&s, "/r/file1", "/r", "renamed"),
            Ok("/r/renamed".to_string())
        );
    }

    #[test]
    fn test_file_checks() {
        let s = state();
        assert_eq!(write(&s, "/r/file1"), Ok(()));
        assert_eq!(write(&s, "/r/dir1"), Err(Error::not_a_file("/r/dir1")));
        assert_eq!(rm(&s, "/r/missing"), Err(Error::not_found("/r/missing")));
        assert_eq!(rm(&s, ""), Err(Error::path_invalid("")));
    }
}
