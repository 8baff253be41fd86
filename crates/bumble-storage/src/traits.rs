//! Storage abstraction trait
//!
//! This module defines the [`ImageStore`] capability every backend implements.

use async_trait::async_trait;
use bumble_core::{Account, ImageItem};
use bumble_processing::ProcessingError;
use bytes::Bytes;
use std::path::Path;
use thiserror::Error;

use crate::backend::BackendKind;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to list images from GitHub (status {status})")]
    RemoteList { status: u16 },

    #[error("GitHub upload failed: {status} {body}")]
    RemoteSave { status: u16, body: String },

    #[error("Local storage error: {0}")]
    LocalIo(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name, as picked.
    pub name: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        UploadFile {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub async fn from_path(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(UploadFile::new(name, data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Where a saved file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// Repository path (remote) or record key (local).
    pub key: String,
    /// Display reference of the new item, when the backend reports one.
    pub reference: Option<String>,
}

/// Image persistence capability.
///
/// Both backends expose the same two operations so the gateway can hand out
/// either one without callers knowing which.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Items in `account`'s namespace, in backend order. A namespace that does
    /// not exist yet is empty.
    async fn list(&self, account: Account) -> StorageResult<Vec<ImageItem>>;

    /// Store one file in `account`'s namespace.
    async fn save(&self, account: Account, file: &UploadFile) -> StorageResult<SavedImage>;

    fn backend_kind(&self) -> BackendKind;
}
