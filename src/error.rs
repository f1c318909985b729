use crate::attachments::error::MergeError;
use crate::db::error::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Serialize)]
pub struct ErrorS {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("child not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(StoreError),

    #[error("search failed: {0}")]
    Search(anyhow::Error),

    #[error("pdf generation failed: {0}")]
    Pdf(anyhow::Error),

    #[error("invalid upload: {0}")]
    Upload(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => AppError::NotFound(id),
            err @ StoreError::AttachmentExists { .. } => AppError::Conflict(err.to_string()),
            other => AppError::Store(other),
        }
    }
}

impl From<MergeError> for AppError {
    fn from(err: MergeError) -> Self {
        AppError::Conflict(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Search(_) | AppError::Pdf(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{self}");
        }
        HttpResponse::build(status).json(ErrorS {
            error: format!("{self}"),
        })
    }
}
