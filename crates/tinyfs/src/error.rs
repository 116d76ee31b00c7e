use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A violated precondition of a filesystem operation.
///
/// The write side surfaces these to callers before anything is appended
/// to the log. During replay the same values only explain why an
/// operation was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid path: {0:?}")]
    PathInvalid(String),

    #[error("Invalid name: {0:?}")]
    NameInvalid(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Immutable path: {0}")]
    Immutable(String),

    #[error("Cannot place {path} inside itself at {dest}")]
    Cycle { path: String, dest: String },
}

impl Error {
    pub fn path_invalid<S: AsRef<str>>(path: S) -> Self {
        Error::PathInvalid(path.as_ref().to_string())
    }

    pub fn name_invalid<S: AsRef<str>>(name: S) -> Self {
        Error::NameInvalid(name.as_ref().to_string())
    }

    pub fn not_found<S: AsRef<str>>(path: S) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn already_exists<S: AsRef<str>>(path: S) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn not_a_directory<S: AsRef<str>>(path: S) -> Self {
        Error::NotADirectory(path.as_ref().to_string())
    }

    pub fn not_a_file<S: AsRef<str>>(path: S) -> Self {
        Error::NotAFile(path.as_ref().to_string())
    }

    pub fn immutable<S: AsRef<str>>(path: S) -> Self {
        Error::Immutable(path.as_ref().to_string())
    }

    pub fn cycle<S: AsRef<str>, D: AsRef<str>>(path: S, dest: D) -> Self {
        Error::Cycle {
            path: path.as_ref().to_string(),
            dest: dest.as_ref().to_string(),
        }
    }
}
