use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("attachment {key} already exists")]
    AttachmentExists { key: String },
}
