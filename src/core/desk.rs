use crate::core::booking::BookingLocks;
use crate::core::rows::{self, MASTER_STATUS_COLUMN};
use crate::domain::model::{
    Bid, Branch, Deal, DealStatus, DealSubmission, Table, UploadFile, ACCEPTED_DOCUMENT_EXTENSIONS,
    DEAL_TYPE_TAG,
};
use crate::domain::ports::{BlobStore, RecordStore, StoredBlob};
use crate::utils::error::{DeskError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_positive_amount, validate_required, validate_required_text,
};
use chrono::{Local, NaiveDateTime, Timelike};
use serde_json::Value;

pub const DEFAULT_DEAL_FOLDER: &str = "credits_fin_system";
pub const DEFAULT_BID_FOLDER: &str = "credits_fin_bids";

/// Blob store namespaces for the two kinds of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFolders {
    pub deals: String,
    pub bids: String,
}

impl Default for UploadFolders {
    fn default() -> Self {
        Self {
            deals: DEFAULT_DEAL_FOLDER.to_string(),
            bids: DEFAULT_BID_FOLDER.to_string(),
        }
    }
}

/// The deal workflow: records FIN-CLOSE deals and arbitrates bids on them.
pub struct DealDesk<R: RecordStore, B: BlobStore> {
    records: R,
    blobs: B,
    folders: UploadFolders,
    booking: BookingLocks,
}

impl<R: RecordStore, B: BlobStore> DealDesk<R, B> {
    pub fn new(records: R, blobs: B) -> Self {
        Self::with_folders(records, blobs, UploadFolders::default())
    }

    pub fn with_folders(records: R, blobs: B, folders: UploadFolders) -> Self {
        Self {
            records,
            blobs,
            folders,
            booking: BookingLocks::new(),
        }
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>> {
        let rows = self.records.read_rows(Table::Branches).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.first())
            .map(rows::cell_text)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .map(|name| Branch { name })
            .collect())
    }

    pub async fn submit_deal(&self, submission: DealSubmission) -> Result<Deal> {
        let branch = validate_required_text("branch", &submission.branch)?;
        let customer_name = validate_required_text("customer_name", &submission.customer_name)?;
        let customer_id = validate_required_text("customer_id", &submission.customer_id)?;
        let account_number = validate_required_text("account_number", &submission.account_number)?;
        let amount = *validate_required("amount", &submission.amount)?;
        validate_positive_amount("amount", amount)?;
        let scheme_code = validate_required_text("scheme_code", &submission.scheme_code)?;
        let roi = *validate_required("roi", &submission.roi)?;
        validate_positive_amount("roi", roi)?;
        let maturity_date = *validate_required("maturity_date", &submission.maturity_date)?;
        let put_date = *validate_required("put_date", &submission.put_date)?;
        let certificate = validate_required("certificate", &submission.certificate)?;
        validate_document("certificate", certificate)?;

        self.ensure_known_branch("branch", branch).await?;

        let existing = self.records.read_rows(Table::Master).await?;
        if existing
            .iter()
            .any(|row| rows::account_of(row) == account_number)
        {
            return Err(DeskError::validation(
                "account_number",
                format!("account {} is already recorded", account_number),
            ));
        }

        tracing::debug!(
            "Uploading certificate '{}' ({} bytes) to {}",
            certificate.file_name,
            certificate.bytes.len(),
            self.folders.deals
        );
        let stored = self.blobs.upload(certificate, &self.folders.deals).await?;

        let deal = Deal {
            timestamp: now(),
            type_tag: DEAL_TYPE_TAG.to_string(),
            branch: branch.to_string(),
            customer_name: customer_name.to_string(),
            customer_id: customer_id.to_string(),
            account_number: account_number.to_string(),
            amount,
            scheme_code: scheme_code.to_string(),
            roi,
            maturity_date,
            put_date,
            certificate_url: stored.secure_url.clone(),
            status: DealStatus::Open,
        };

        if let Err(e) = self.records.append_row(Table::Master, rows::encode_deal(&deal)).await {
            tracing::error!(
                "MASTER append failed for account {}; certificate {} left in blob store",
                deal.account_number,
                stored.public_id
            );
            return Err(e);
        }

        tracing::info!(
            "✅ Deal recorded: account {} from {} ({})",
            deal.account_number,
            deal.branch,
            rows::format_number(deal.amount)
        );
        Ok(deal)
    }

    /// Open deals in store order, optionally narrowed by a whole-record search.
    pub async fn list_open_deals(&self, search_filter: Option<&str>) -> Result<Vec<Deal>> {
        let filter = search_filter.map(str::trim).filter(|f| !f.is_empty());
        let stored = self.records.read_rows(Table::Master).await?;

        let mut deals = Vec::new();
        for (index, row) in stored.iter().enumerate() {
            if rows::status_of(row) != Some(DealStatus::Open) {
                continue;
            }
            if let Some(filter) = filter {
                if !rows::row_matches(row, filter) {
                    continue;
                }
            }
            match rows::decode_deal(row) {
                Ok(deal) => deals.push(deal),
                Err(e) => tracing::warn!("Skipping MASTER row {}: {}", index, e),
            }
        }

        tracing::debug!("{} open deals (filter: {:?})", deals.len(), filter);
        Ok(deals)
    }

    pub async fn place_bid(
        &self,
        account_number: &str,
        bidding_branch: &str,
        bid_file: Option<UploadFile>,
    ) -> Result<Bid> {
        let account_number = account_number.trim();
        let bidding_branch = bidding_branch.trim();
        if account_number.is_empty() {
            return Err(DeskError::validation("account_number", "account number cannot be empty"));
        }
        if bidding_branch.is_empty() {
            return Err(DeskError::validation("bidding_branch", "select a bidding branch"));
        }
        let bid_file = bid_file.ok_or(DeskError::MissingBidDocument)?;
        validate_document("bid_file", &bid_file)?;
        self.ensure_known_branch("bidding_branch", bidding_branch).await?;

        let stored = self.blobs.upload(&bid_file, &self.folders.bids).await?;

        match self.book(account_number, bidding_branch, &stored).await {
            Ok(bid) => {
                tracing::info!(
                    "✅ Bid placed: account {} booked by {}",
                    bid.account_number,
                    bid.bidding_branch
                );
                Ok(bid)
            }
            Err(e) => {
                tracing::warn!("Bid by {} on {} rejected: {}", bidding_branch, account_number, e);
                // 沒有 BRANCH_BIDS 列指向它，文件就不保留
                self.discard(&stored).await;
                Err(e)
            }
        }
    }

    async fn book(&self, account_number: &str, bidding_branch: &str, document: &StoredBlob) -> Result<Bid> {
        let _guard = self.booking.acquire(account_number).await;

        // 重新讀取，縮小過期資料的時間窗
        let latest = self.records.read_rows(Table::Master).await?;
        let (index, row) = latest
            .iter()
            .enumerate()
            .find(|(_, row)| rows::account_of(row) == account_number)
            .ok_or_else(|| DeskError::DealNotFound {
                account_number: account_number.to_string(),
            })?;

        if rows::status_of(row) != Some(DealStatus::Open) {
            return Err(DeskError::ConflictError {
                account_number: account_number.to_string(),
            });
        }
        let deal = rows::decode_deal(row)?;

        let booked = self
            .records
            .compare_and_set_cell(
                Table::Master,
                index,
                MASTER_STATUS_COLUMN,
                DealStatus::Open.as_str(),
                Value::from(DealStatus::Booked.as_str()),
            )
            .await?;
        if !booked {
            return Err(DeskError::ConflictError {
                account_number: account_number.to_string(),
            });
        }

        let bid = Bid::from_deal(&deal, bidding_branch, &document.secure_url, now());
        if let Err(e) = self.records.append_row(Table::BranchBids, rows::encode_bid(&bid)).await {
            tracing::error!("Bid append failed for {}, reopening deal: {}", account_number, e);
            let reverted = self
                .records
                .compare_and_set_cell(
                    Table::Master,
                    index,
                    MASTER_STATUS_COLUMN,
                    DealStatus::Booked.as_str(),
                    Value::from(DealStatus::Open.as_str()),
                )
                .await;
            if !matches!(reverted, Ok(true)) {
                tracing::error!("Deal {} left BOOKED without a bid row", account_number);
            }
            return Err(e);
        }

        Ok(bid)
    }

    async fn discard(&self, blob: &StoredBlob) {
        match self.blobs.delete(blob).await {
            Ok(()) => tracing::debug!("Removed rejected bid document {}", blob.public_id),
            Err(e) => tracing::warn!("Could not remove bid document {}: {}", blob.public_id, e),
        }
    }

    async fn ensure_known_branch(&self, field: &str, branch: &str) -> Result<()> {
        let branches = self.list_branches().await?;
        if branches.iter().any(|b| b.name == branch) {
            Ok(())
        } else {
            Err(DeskError::validation(
                field,
                format!("'{}' is not a registered branch", branch),
            ))
        }
    }
}

fn validate_document(field: &str, file: &UploadFile) -> Result<()> {
    validate_file_extension(field, &file.file_name, &ACCEPTED_DOCUMENT_EXTENSIONS)?;
    if file.bytes.is_empty() {
        return Err(DeskError::validation(field, format!("'{}' is empty", file.file_name)));
    }
    Ok(())
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
