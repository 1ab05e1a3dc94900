//! Cloudinary signed upload and destroy.

use crate::config::toml_config::CloudinaryConfig;
use crate::domain::model::UploadFile;
use crate::domain::ports::{BlobStore, StoredBlob};
use crate::utils::error::{DeskError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";
pub const SIGNATURE_ALGORITHM: &str = "sha256";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: Option<String>,
    #[serde(default = "default_resource_type")]
    resource_type: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

fn default_resource_type() -> String {
    "image".to_string()
}

#[derive(Debug, Clone)]
pub struct CloudinaryBlobStore {
    client: Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryBlobStore {
    pub fn new(
        api_base: impl Into<String>,
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn from_config(config: &CloudinaryConfig) -> Self {
        Self::new(
            config.api_base(),
            config.cloud_name.clone(),
            config.api_key.clone(),
            config.api_secret.clone(),
        )
    }

    /// Request signature: params sorted by name, joined as `k=v&k=v`, secret
    /// appended, SHA-256 hex digest. `file`, `api_key`, `resource_type` and
    /// `signature_algorithm` are never signed.
    pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut signed: Vec<&(&str, &str)> = params
            .iter()
            .filter(|(key, value)| {
                !matches!(
                    *key,
                    "file" | "api_key" | "resource_type" | "signature_algorithm"
                ) && !value.is_empty()
            })
            .collect();
        signed.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = signed
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.cloud_name,
            resource_type,
            action
        )
    }
}

#[async_trait]
impl BlobStore for CloudinaryBlobStore {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredBlob> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("folder", folder), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.mime_type())
            .map_err(|e| DeskError::upload(format!("invalid content type: {}", e)))?;
        let form = Form::new()
            .part("file", part)
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", SIGNATURE_ALGORITHM);

        let url = self.endpoint("auto", "upload");
        tracing::debug!("Uploading '{}' to {}", file.file_name, url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DeskError::upload(format!("upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeskError::upload(format!("upload returned {}: {}", status, body)));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| DeskError::upload(format!("unexpected upload response: {}", e)))?;
        let secure_url = body
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| DeskError::upload("upload response carried no secure_url"))?;

        Ok(StoredBlob {
            public_id: body.public_id,
            secure_url,
            resource_type: body.resource_type,
        })
    }

    async fn delete(&self, blob: &StoredBlob) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("public_id", blob.public_id.as_str()), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );
        let params = [
            ("public_id", blob.public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", SIGNATURE_ALGORITHM),
        ];

        let response = self
            .client
            .post(self.endpoint(&blob.resource_type, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| DeskError::upload(format!("destroy request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeskError::upload(format!("destroy returned {}: {}", status, body)));
        }
        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| DeskError::upload(format!("unexpected destroy response: {}", e)))?;

        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(DeskError::upload(format!(
                "destroy of {} answered '{}'",
                blob.public_id, other
            ))),
        }
    }
}
