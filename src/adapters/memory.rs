use crate::core::rows::cell_text;
use crate::domain::model::{Table, UploadFile};
use crate::domain::ports::{BlobStore, RecordStore, Row, StoredBlob};
use crate::utils::error::{DeskError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Record store held in process memory. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<Mutex<HashMap<Table, Vec<Row>>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = branches
            .into_iter()
            .map(|name| vec![serde_json::Value::String(name.into())])
            .collect();
        let mut tables = HashMap::new();
        tables.insert(Table::Branches, rows);
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    /// Snapshot of a table's rows.
    pub async fn rows(&self, table: Table) -> Vec<Row> {
        let tables = self.tables.lock().await;
        tables.get(&table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn read_rows(&self, table: Table) -> Result<Vec<Row>> {
        Ok(self.rows(table).await)
    }

    async fn append_row(&self, table: Table, row: Row) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.entry(table).or_default().push(row);
        Ok(())
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        value: serde_json::Value,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let cells = tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(row))
            .ok_or_else(|| DeskError::store(format!("{} has no row {}", table, row)))?;
        if cells.len() <= column {
            cells.resize(column + 1, serde_json::Value::Null);
        }
        cells[column] = value;
        Ok(())
    }

    async fn compare_and_set_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        expected: &str,
        value: serde_json::Value,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let cells = tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(row))
            .ok_or_else(|| DeskError::store(format!("{} has no row {}", table, row)))?;
        let current = cells.get(column).map(cell_text).unwrap_or_default();
        if !current.trim().eq_ignore_ascii_case(expected.trim()) {
            return Ok(false);
        }
        if cells.len() <= column {
            cells.resize(column + 1, serde_json::Value::Null);
        }
        cells[column] = value;
        Ok(true)
    }
}

/// Blob store held in process memory, with an optional forced failure mode.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    next_id: Arc<AtomicU64>,
    fail_uploads: bool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload returns an `UploadError`.
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub async fn stored_ids(&self) -> Vec<String> {
        let blobs = self.blobs.lock().await;
        let mut ids: Vec<String> = blobs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredBlob> {
        if self.fail_uploads {
            return Err(DeskError::upload(format!(
                "blob store rejected '{}'",
                file.file_name
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let public_id = format!("{}/{}-{}", folder, id, file.file_name);
        self.blobs
            .lock()
            .await
            .insert(public_id.clone(), file.bytes.clone());
        Ok(StoredBlob {
            secure_url: format!("memory://{}", public_id),
            public_id,
            resource_type: "raw".to_string(),
        })
    }

    async fn delete(&self, blob: &StoredBlob) -> Result<()> {
        self.blobs.lock().await.remove(&blob.public_id);
        self.deleted.lock().await.push(blob.public_id.clone());
        Ok(())
    }
}
