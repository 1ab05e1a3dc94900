use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("No bid document attached")]
    MissingBidDocument,

    #[error("Upload failed: {message}")]
    UploadError { message: String },

    #[error("Deal for account '{account_number}' is already booked")]
    ConflictError { account_number: String },

    #[error("No deal recorded for account '{account_number}'")]
    DealNotFound { account_number: String },

    #[error("Record store error: {message}")]
    StoreError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, DeskError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Upload,
    Conflict,
    Store,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl DeskError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        Self::UploadError {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::MissingBidDocument => ErrorCategory::Validation,
            Self::UploadError { .. } => ErrorCategory::Upload,
            Self::ConflictError { .. } | Self::DealNotFound { .. } => ErrorCategory::Conflict,
            Self::StoreError { .. } | Self::SerializationError(_) => ErrorCategory::Store,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Conflict => ErrorSeverity::High,
            ErrorCategory::Upload | ErrorCategory::Store => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "Fill in every field and attach a PNG, JPG or PDF document",
            Self::MissingBidDocument => "Attach the bid document (PNG, JPG or PDF) and bid again",
            Self::UploadError { .. } => "Check the document store credentials and retry the action",
            Self::ConflictError { .. } => "Refresh the open deals list and pick another deal",
            Self::DealNotFound { .. } => "Refresh the open deals list; the account number may be mistyped",
            Self::StoreError { .. } | Self::SerializationError(_) => {
                "Check network access and the spreadsheet access token, then retry the action"
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the TOML configuration file",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::CsvError(_) => "Check that the output is writable",
        }
    }

    /// Process exit status for a failed command; never 0.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    /// Message shown to the branch user.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message, .. } => format!("All fields mandatory: {}", message),
            Self::MissingBidDocument => "Please select a file before bidding".to_string(),
            Self::UploadError { .. } => "Document upload failed".to_string(),
            Self::ConflictError { .. } => "Already taken by another branch".to_string(),
            Self::DealNotFound { account_number } => {
                format!("No deal found for account {}", account_number)
            }
            Self::StoreError { .. } | Self::SerializationError(_) => {
                "Could not reach the deal register, please retry".to_string()
            }
            other => other.to_string(),
        }
    }
}
