// Adapters layer: concrete record and blob stores behind the domain ports.

pub mod cloudinary;
pub mod local;
pub mod memory;
pub mod sheets;

use crate::config::toml_config::BlobStoreConfig;
use crate::domain::model::UploadFile;
use crate::domain::ports::{BlobStore, StoredBlob};
use crate::utils::error::Result;
use async_trait::async_trait;

pub use cloudinary::CloudinaryBlobStore;
pub use local::LocalBlobStore;
pub use memory::{InMemoryBlobStore, InMemoryRecordStore};
pub use sheets::GoogleSheetsStore;

/// The blob store selected by `[blob_store] type = ...`.
#[derive(Debug, Clone)]
pub enum ConfiguredBlobStore {
    Cloudinary(CloudinaryBlobStore),
    Local(LocalBlobStore),
}

impl ConfiguredBlobStore {
    pub fn from_config(config: &BlobStoreConfig) -> Self {
        match config {
            BlobStoreConfig::Cloudinary(cloudinary) => {
                Self::Cloudinary(CloudinaryBlobStore::from_config(cloudinary))
            }
            BlobStoreConfig::Local(local) => Self::Local(LocalBlobStore::new(&local.base_path)),
        }
    }
}

#[async_trait]
impl BlobStore for ConfiguredBlobStore {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredBlob> {
        match self {
            Self::Cloudinary(store) => store.upload(file, folder).await,
            Self::Local(store) => store.upload(file, folder).await,
        }
    }

    async fn delete(&self, blob: &StoredBlob) -> Result<()> {
        match self {
            Self::Cloudinary(store) => store.delete(blob).await,
            Self::Local(store) => store.delete(blob).await,
        }
    }
}
