use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("child not found: {id}")]
    NotFound { id: String },

    #[error("attachment {key} already exists on child {id}")]
    AttachmentExists { id: String, key: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store connection poisoned")]
    Poisoned,
}
