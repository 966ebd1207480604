use std::path::PathBuf;
use storage::StoreError;

/// Startup failures. The process refuses to start on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("VIDEO_FOLDER_PATH is not set")]
    MissingVideoRoot,
    #[error("video root {given:?} resolved to {resolved:?}, which is not a valid directory")]
    InvalidVideoRoot { given: String, resolved: PathBuf },
    #[error("PREDEFINED_TAGS is not valid JSON: {0}")]
    MalformedTags(#[source] serde_json::Error),
    #[error("PREDEFINED_TAGS must be a JSON array of strings")]
    TagsNotStringArray,
    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),
    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum TaggingError {
    #[error("Invalid tag. Must be one of {}", valid.join(", "))]
    InvalidTag { tag: String, valid: Vec<String> },
    #[error("Video not found")]
    NotFound(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("directory walker failed: {0}")]
    Walker(#[from] tokio::task::JoinError),
}
