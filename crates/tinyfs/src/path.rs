use crate::error::{Error, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// The designated root directory. It always exists and is never removed.
pub const ROOT: &str = "/r";

/// Separator between path segments
pub const SEPARATOR: char = '/';

static PATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:/[^/\s]+)+$").expect("static path pattern"));

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/\s]+$").expect("static name pattern"));

/// One or more `/`-prefixed segments, none empty, none containing `/` or
/// whitespace, and no trailing `/`.
#[must_use]
pub fn path_valid(path: &str) -> bool {
    PATH_PATTERN.is_match(path)
}

/// A single non-empty segment without `/` or whitespace.
#[must_use]
pub fn name_valid(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Appends `name` to `path`.
pub fn join(path: &str, name: &str) -> Result<String> {
    if !path_valid(path) {
        return Err(Error::path_invalid(path));
    }
    if !name_valid(name) {
        return Err(Error::name_invalid(name));
    }
    Ok(format!("{path}{SEPARATOR}{name}"))
}

/// Returns the parent path, or `None` for a single-segment path like the root.
pub fn parent_of(path: &str) -> Result<Option<&str>> {
    if !path_valid(path) {
        return Err(Error::path_invalid(path));
    }
    // A valid path always starts with the separator.
    Ok(path
        .rfind(SEPARATOR)
        .filter(|&idx| idx > 0)
        .map(|idx| &path[..idx]))
}

/// Returns the final segment of a path.
pub fn last_segment(path: &str) -> Result<&str> {
    if !path_valid(path) {
        return Err(Error::path_invalid(path));
    }
    path.rsplit(SEPARATOR)
        .next()
        .ok_or_else(|| Error::path_invalid(path))
}

/// True when `candidate` is strictly nested under `path`.
#[must_use]
pub fn is_nested(path: &str, candidate: &str) -> bool {
    candidate.len() > path.len() + 1
        && candidate.starts_with(path)
        && candidate.as_bytes()[path.len()] == b'/'
}

/// Number of segments in a path string.
#[must_use]
pub fn depth(path: &str) -> usize {
    path.matches(SEPARATOR).count()
}

/// Rewrites a path under `from` so it sits under `to` instead.
///
/// `p` must be `from` itself or nested under it.
#[must_use]
pub fn rebase(p: &str, from: &str, to: &str) -> String {
    format!("{to}{}", &p[from.len()..])
}

/// Listing order: case-insensitive comparison of the full path, falling
/// back to the exact bytes so distinct paths never compare equal.
#[must_use]
pub fn listing_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sorts paths into listing order in place.
pub fn sort_listing(paths: &mut [String]) {
    paths.sort_by(|a, b| listing_order(a, b));
}
