use specsync::v1::CollectionId;
use specsync_openapi::OpenApiError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

/// Failures inside a [`CollectionStore`](crate::CollectionStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Collection not found: {0}")]
    NotFound(CollectionId),

    #[error("Invalid collection id: {0:?}")]
    InvalidId(CollectionId),

    #[error("Invalid collection document: {0}")]
    InvalidDocument(PathBuf),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Spec(#[from] OpenApiError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
