use crate::domain::model::UploadFile;
use crate::domain::ports::{BlobStore, StoredBlob};
use crate::utils::error::{DeskError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Keeps documents on the local filesystem under `base_path/<folder>/`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn sanitize(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredBlob> {
        let folder = Self::sanitize(folder);
        let name = Self::sanitize(&file.file_name);
        let stamp = Utc::now().timestamp_millis();

        let folder_path = self.base_path.join(&folder);
        tokio::fs::create_dir_all(&folder_path)
            .await
            .map_err(|e| DeskError::upload(format!("{}: {}", folder_path.display(), e)))?;

        // 同名同毫秒的上傳不可互相覆蓋，create_new 搶到路徑才算數
        let mut claimed = None;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let public_id = if attempt == 0 {
                format!("{}/{}-{}", folder, stamp, name)
            } else {
                format!("{}/{}-{}-{}", folder, stamp, attempt, name)
            };
            let full_path = self.base_path.join(&public_id);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&full_path)
                .await
            {
                Ok(handle) => {
                    claimed = Some((public_id, full_path, handle));
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(DeskError::upload(format!("{}: {}", full_path.display(), e)));
                }
            }
        }
        let (public_id, full_path, mut handle) = claimed.ok_or_else(|| {
            DeskError::upload(format!("no free name for '{}' in {}", name, folder))
        })?;

        handle
            .write_all(&file.bytes)
            .await
            .map_err(|e| DeskError::upload(format!("{}: {}", full_path.display(), e)))?;
        handle
            .flush()
            .await
            .map_err(|e| DeskError::upload(format!("{}: {}", full_path.display(), e)))?;

        let absolute = tokio::fs::canonicalize(&full_path)
            .await
            .map_err(|e| DeskError::upload(format!("{}: {}", full_path.display(), e)))?;
        let secure_url = Url::from_file_path(&absolute)
            .map_err(|_| DeskError::upload(format!("cannot build URL for {}", absolute.display())))?;

        tracing::debug!("Stored {} ({} bytes)", full_path.display(), file.bytes.len());
        Ok(StoredBlob {
            public_id,
            secure_url: secure_url.to_string(),
            resource_type: "raw".to_string(),
        })
    }

    async fn delete(&self, blob: &StoredBlob) -> Result<()> {
        let full_path = self.base_path.join(Path::new(&blob.public_id));
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DeskError::IoError(e)),
        }
    }
}
