//! Per-user session state for the two screens.
//!
//! Each user gets their own `Session`; nothing here is shared between users.
//! Actions report their outcome twice: as the returned `Result` and as a
//! `Notice` queued for display.

use crate::core::desk::DealDesk;
use crate::domain::model::{Bid, Deal, DealSubmission, UploadFile};
use crate::domain::ports::{BlobStore, RecordStore};
use crate::utils::error::{DeskError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    FinClose,
    OpenDeals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
    Info(String),
}

/// In-flight bid inputs for one row of the open deals table.
#[derive(Debug, Clone, Default)]
pub struct BidForm {
    pub bidding_branch: Option<String>,
    pub document: Option<UploadFile>,
}

#[derive(Debug, Default)]
pub struct Session {
    screen: Screen,
    search: String,
    open_deals: Vec<Deal>,
    bid_forms: HashMap<String, BidForm>,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn go_home(&mut self) {
        self.screen = Screen::Home;
    }

    pub fn open_fin_close(&mut self) {
        self.screen = Screen::FinClose;
    }

    pub fn open_deals(&mut self) {
        self.screen = Screen::OpenDeals;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Deals loaded by the last `refresh`.
    pub fn deals(&self) -> &[Deal] {
        &self.open_deals
    }

    pub fn bid_form(&self, account_number: &str) -> Option<&BidForm> {
        self.bid_forms.get(account_number.trim())
    }

    pub fn select_bid_branch(&mut self, account_number: &str, branch: impl Into<String>) {
        self.bid_forms
            .entry(account_number.trim().to_string())
            .or_default()
            .bidding_branch = Some(branch.into());
    }

    pub fn attach_bid_document(&mut self, account_number: &str, document: UploadFile) {
        self.bid_forms
            .entry(account_number.trim().to_string())
            .or_default()
            .document = Some(document);
    }

    /// Drains the queued notices in the order they were raised.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn submit_fin_close<R, B>(
        &mut self,
        desk: &DealDesk<R, B>,
        submission: DealSubmission,
    ) -> Result<Deal>
    where
        R: RecordStore,
        B: BlobStore,
    {
        self.screen = Screen::FinClose;
        match desk.submit_deal(submission).await {
            Ok(deal) => {
                self.notices
                    .push(Notice::Success("Saved Successfully".to_string()));
                Ok(deal)
            }
            Err(e) => {
                self.notices.push(Notice::Error(e.user_friendly_message()));
                Err(e)
            }
        }
    }

    pub async fn refresh<R, B>(&mut self, desk: &DealDesk<R, B>) -> Result<&[Deal]>
    where
        R: RecordStore,
        B: BlobStore,
    {
        self.screen = Screen::OpenDeals;
        let filter = Some(self.search.as_str()).filter(|s| !s.trim().is_empty());
        match desk.list_open_deals(filter).await {
            Ok(deals) => {
                if deals.is_empty() {
                    self.notices
                        .push(Notice::Info("No open deals available".to_string()));
                }
                self.open_deals = deals;
                Ok(self.open_deals.as_slice())
            }
            Err(e) => {
                self.notices.push(Notice::Error(e.user_friendly_message()));
                Err(e)
            }
        }
    }

    pub async fn bid<R, B>(&mut self, desk: &DealDesk<R, B>, account_number: &str) -> Result<Bid>
    where
        R: RecordStore,
        B: BlobStore,
    {
        let account_number = account_number.trim().to_string();
        let form = self.bid_forms.get(&account_number).cloned().unwrap_or_default();

        let outcome = match (form.bidding_branch, form.document) {
            (None, _) => Err(DeskError::validation("bidding_branch", "select a bidding branch")),
            (_, None) => Err(DeskError::MissingBidDocument),
            (Some(branch), Some(document)) => {
                desk.place_bid(&account_number, &branch, Some(document)).await
            }
        };

        match outcome {
            Ok(bid) => {
                self.bid_forms.remove(&account_number);
                self.notices
                    .push(Notice::Success("Bid placed successfully".to_string()));
                self.reload_quietly(desk).await;
                Ok(bid)
            }
            Err(e) => {
                self.notices.push(Notice::Error(e.user_friendly_message()));
                if matches!(e, DeskError::ConflictError { .. }) {
                    self.bid_forms.remove(&account_number);
                    self.reload_quietly(desk).await;
                }
                Err(e)
            }
        }
    }

    // 下單後重新整理列表；失敗只記錄，不覆蓋原本的結果
    async fn reload_quietly<R, B>(&mut self, desk: &DealDesk<R, B>)
    where
        R: RecordStore,
        B: BlobStore,
    {
        if let Err(e) = self.refresh(desk).await {
            tracing::warn!("Could not refresh open deals: {}", e);
        }
    }
}
