use crate::adapters::cloudinary::DEFAULT_CLOUDINARY_API_BASE;
use crate::adapters::sheets::DEFAULT_SHEETS_API_BASE;
use crate::core::desk::{UploadFolders, DEFAULT_BID_FOLDER, DEFAULT_DEAL_FOLDER};
use crate::utils::error::{DeskError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    pub sheets: SheetsConfig,
    pub blob_store: BlobStoreConfig,
    pub uploads: Option<UploadConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub access_token: String,
    pub api_base: Option<String>,
}

impl SheetsConfig {
    pub fn api_base(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlobStoreConfig {
    Cloudinary(CloudinaryConfig),
    Local(LocalBlobConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: Option<String>,
}

impl CloudinaryConfig {
    pub fn api_base(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalBlobConfig {
    pub base_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub deal_folder: Option<String>,
    pub bid_folder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl DeskConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DeskError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DeskError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CLOUDINARY_API_SECRET})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DeskError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn upload_folders(&self) -> UploadFolders {
        let uploads = self.uploads.as_ref();
        UploadFolders {
            deals: uploads
                .and_then(|u| u.deal_folder.clone())
                .unwrap_or_else(|| DEFAULT_DEAL_FOLDER.to_string()),
            bids: uploads
                .and_then(|u| u.bid_folder.clone())
                .unwrap_or_else(|| DEFAULT_BID_FOLDER.to_string()),
        }
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("sheets.spreadsheet_id", &self.sheets.spreadsheet_id)?;
        validate_resolved("sheets.access_token", &self.sheets.access_token)?;
        validate_url("sheets.api_base", &self.sheets.api_base())?;

        match &self.blob_store {
            BlobStoreConfig::Cloudinary(cloudinary) => {
                validate_non_empty_string("blob_store.cloud_name", &cloudinary.cloud_name)?;
                validate_resolved("blob_store.api_key", &cloudinary.api_key)?;
                validate_resolved("blob_store.api_secret", &cloudinary.api_secret)?;
                validate_url("blob_store.api_base", &cloudinary.api_base())?;
            }
            BlobStoreConfig::Local(local) => {
                validate_path("blob_store.base_path", &local.base_path)?;
            }
        }

        let folders = self.upload_folders();
        validate_non_empty_string("uploads.deal_folder", &folders.deals)?;
        validate_non_empty_string("uploads.bid_folder", &folders.bids)?;

        if let Some(level) = self.log_level() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(DeskError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

/// Secrets must be present and must not still hold an unresolved `${VAR}`.
fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.contains("${") {
        return Err(DeskError::MissingConfigError {
            field: format!("{} (environment variable {} is not set)", field_name, value),
        });
    }
    Ok(())
}

impl Validate for DeskConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
