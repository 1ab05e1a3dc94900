pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{
    CloudinaryBlobStore, ConfiguredBlobStore, GoogleSheetsStore, InMemoryBlobStore,
    InMemoryRecordStore, LocalBlobStore,
};
pub use crate::app::Session;
pub use crate::config::toml_config::DeskConfig;
pub use crate::core::desk::{DealDesk, UploadFolders};
pub use crate::utils::error::{DeskError, Result};
