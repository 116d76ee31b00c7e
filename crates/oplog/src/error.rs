// Error types for operation log access
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, OpLogError>;

#[derive(Debug, thiserror::Error)]
pub enum OpLogError {
    #[error("TinyFS error: {0}")]
    TinyFS(#[from] tinyfs::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Crypter error: {message}")]
    Crypter { message: String },

    #[error("Log file {path} unusable: {message}")]
    LogFile { path: PathBuf, message: String },
}

impl OpLogError {
    pub fn crypter(message: impl std::fmt::Display) -> Self {
        OpLogError::Crypter {
            message: message.to_string(),
        }
    }
}
