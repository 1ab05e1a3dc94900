use crate::domain::model::{DealSubmission, UploadFile};
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the registered branches
    Branches,

    /// Record a FIN-CLOSE deal with its certificate
    FinClose(FinCloseArgs),

    /// Show deals that are still open for bidding
    OpenDeals {
        /// Case-insensitive text matched against every field of a deal
        #[arg(short, long)]
        search: Option<String>,

        /// Write CSV to stdout instead of a table
        #[arg(long)]
        csv: bool,
    },

    /// Bid on an open deal, booking it for the bidding branch
    Bid {
        #[arg(long)]
        account_number: String,

        /// Bidding branch
        #[arg(long)]
        branch: String,

        /// Supporting document (png, jpg, jpeg or pdf)
        #[arg(long)]
        document: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct FinCloseArgs {
    #[arg(long)]
    pub branch: Option<String>,

    #[arg(long)]
    pub customer_name: Option<String>,

    #[arg(long)]
    pub customer_id: Option<String>,

    #[arg(long)]
    pub account_number: Option<String>,

    #[arg(long)]
    pub amount: Option<f64>,

    #[arg(long)]
    pub scheme_code: Option<String>,

    #[arg(long)]
    pub roi: Option<f64>,

    /// YYYY-MM-DD or DD-MM-YYYY
    #[arg(long, value_parser = parse_date)]
    pub maturity_date: Option<NaiveDate>,

    /// YYYY-MM-DD or DD-MM-YYYY
    #[arg(long, value_parser = parse_date)]
    pub put_date: Option<NaiveDate>,

    /// Certificate file (png, jpg, jpeg or pdf)
    #[arg(long)]
    pub certificate: Option<String>,
}

impl FinCloseArgs {
    pub async fn into_submission(self) -> Result<DealSubmission> {
        let certificate = match &self.certificate {
            Some(path) => Some(UploadFile::from_path(path).await?),
            None => None,
        };

        Ok(DealSubmission {
            branch: self.branch,
            customer_name: self.customer_name,
            customer_id: self.customer_id,
            account_number: self.account_number,
            amount: self.amount,
            scheme_code: self.scheme_code,
            roi: self.roi,
            maturity_date: self.maturity_date,
            put_date: self.put_date,
            certificate,
        })
    }
}

pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value.trim(), "%d-%m-%Y"))
        .map_err(|_| format!("'{}' is not a date (YYYY-MM-DD or DD-MM-YYYY)", value))
}
