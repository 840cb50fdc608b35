use clinic_core::prelude::StoreError;
use clinic_fs::MirrorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote store error: {0}")]
    Store(#[from] StoreError),

    #[error("Local mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("No parent folder found for {0}")]
    MissingParent(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
