use crate::domain::model::{Table, UploadFile};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One stored row, cells in column order.
pub type Row = Vec<serde_json::Value>;

/// Tabular persistence. Row and column indexes are zero-based and exclude the header row.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read_rows(&self, table: Table) -> Result<Vec<Row>>;

    async fn append_row(&self, table: Table, row: Row) -> Result<()>;

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        value: serde_json::Value,
    ) -> Result<()>;

    /// Writes `value` only if the cell text currently equals `expected`
    /// (trimmed, case-insensitive). Returns whether the write happened.
    async fn compare_and_set_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        expected: &str,
        value: serde_json::Value,
    ) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub public_id: String,
    pub secure_url: String,
    pub resource_type: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredBlob>;

    async fn delete(&self, blob: &StoredBlob) -> Result<()>;
}
