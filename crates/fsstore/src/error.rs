use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Pre-flight rejection; nothing was appended
    #[error("Rejected: {0}")]
    Validation(#[from] tinyfs::Error),

    #[error("Batch operation {index} rejected: {source}")]
    Batch {
        index: usize,
        source: tinyfs::Error,
    },

    #[error("Batch has no operations")]
    EmptyBatch,

    #[error("Log error: {0}")]
    Log(#[from] oplog::OpLogError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
