use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEAL_TYPE_TAG: &str = "FIN-CLOSE";
pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ACCEPTED_DOCUMENT_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

/// Logical tables of the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Branches,
    Master,
    BranchBids,
}

impl Table {
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Table::Branches => "BRANCHES",
            Table::Master => "MASTER",
            Table::BranchBids => "BRANCH_BIDS",
        }
    }

    /// Number of columns a row of this table carries.
    pub fn width(&self) -> usize {
        match self {
            Table::Branches => 1,
            Table::Master => 13,
            Table::BranchBids => 11,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealStatus {
    Open,
    Booked,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Open => "OPEN",
            DealStatus::Booked => "BOOKED",
        }
    }

    /// Case-insensitive, whitespace tolerant.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Some(DealStatus::Open),
            "BOOKED" => Some(DealStatus::Booked),
            _ => None,
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A FIN-CLOSE record, one row of MASTER.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub timestamp: NaiveDateTime,
    pub type_tag: String,
    pub branch: String,
    pub customer_name: String,
    pub customer_id: String,
    pub account_number: String,
    pub amount: f64,
    pub scheme_code: String,
    pub roi: f64,
    pub maturity_date: NaiveDate,
    pub put_date: NaiveDate,
    pub certificate_url: String,
    pub status: DealStatus,
}

impl Deal {
    pub fn is_open(&self) -> bool {
        self.status == DealStatus::Open
    }
}

/// A branch's claim on a deal, one row of BRANCH_BIDS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub timestamp: NaiveDateTime,
    pub customer_name: String,
    pub account_number: String,
    pub amount: f64,
    pub scheme_code: String,
    pub roi: f64,
    pub maturity_date: NaiveDate,
    pub put_date: NaiveDate,
    pub origin_branch: String,
    pub bidding_branch: String,
    pub document_url: String,
}

impl Bid {
    pub fn from_deal(
        deal: &Deal,
        bidding_branch: &str,
        document_url: &str,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            timestamp,
            customer_name: deal.customer_name.clone(),
            account_number: deal.account_number.clone(),
            amount: deal.amount,
            scheme_code: deal.scheme_code.clone(),
            roi: deal.roi,
            maturity_date: deal.maturity_date,
            put_date: deal.put_date,
            origin_branch: deal.branch.clone(),
            bidding_branch: bidding_branch.to_string(),
            document_url: document_url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
}

/// A document picked by the user, held in memory for the duration of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Self { file_name, bytes })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        match self.extension()?.as_str() {
            "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("pdf") => "application/pdf",
            _ => "application/octet-stream",
        }
    }
}

/// The FIN-CLOSE form as collected from the user. Missing fields stay `None`
/// so the workflow can report them.
#[derive(Debug, Clone, Default)]
pub struct DealSubmission {
    pub branch: Option<String>,
    pub customer_name: Option<String>,
    pub customer_id: Option<String>,
    pub account_number: Option<String>,
    pub amount: Option<f64>,
    pub scheme_code: Option<String>,
    pub roi: Option<f64>,
    pub maturity_date: Option<NaiveDate>,
    pub put_date: Option<NaiveDate>,
    pub certificate: Option<UploadFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(DealStatus::parse(" open "), Some(DealStatus::Open));
        assert_eq!(DealStatus::parse("Booked"), Some(DealStatus::Booked));
        assert_eq!(DealStatus::parse("CLOSED"), None);
        assert_eq!(DealStatus::parse(""), None);
    }

    #[test]
    fn test_upload_file_kind() {
        assert_eq!(UploadFile::new("cert.PDF", vec![1]).kind(), Some(DocumentKind::Pdf));
        assert_eq!(UploadFile::new("scan.jpeg", vec![1]).kind(), Some(DocumentKind::Image));
        assert_eq!(UploadFile::new("scan.jpeg", vec![1]).mime_type(), "image/jpeg");
        assert_eq!(UploadFile::new("notes.docx", vec![1]).kind(), None);
    }

    #[test]
    fn test_table_layout() {
        assert_eq!(Table::Master.width(), 13);
        assert_eq!(Table::BranchBids.width(), 11);
        assert_eq!(Table::BranchBids.to_string(), "BRANCH_BIDS");
    }
}
