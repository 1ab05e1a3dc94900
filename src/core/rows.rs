//! Positional codec between domain records and store rows.
//!
//! Column positions are part of the stored format: MASTER carries 13 columns
//! with the status last, BRANCH_BIDS carries 11.

use crate::domain::model::{Bid, Deal, DealStatus, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::domain::ports::Row;
use crate::utils::error::{DeskError, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::Value;

pub const MASTER_TIMESTAMP_COLUMN: usize = 0;
pub const MASTER_TYPE_COLUMN: usize = 1;
pub const MASTER_BRANCH_COLUMN: usize = 2;
pub const MASTER_CUSTOMER_NAME_COLUMN: usize = 3;
pub const MASTER_CUSTOMER_ID_COLUMN: usize = 4;
pub const MASTER_ACCOUNT_COLUMN: usize = 5;
pub const MASTER_AMOUNT_COLUMN: usize = 6;
pub const MASTER_SCHEME_COLUMN: usize = 7;
pub const MASTER_ROI_COLUMN: usize = 8;
pub const MASTER_MATURITY_COLUMN: usize = 9;
pub const MASTER_PUT_COLUMN: usize = 10;
pub const MASTER_CERTIFICATE_COLUMN: usize = 11;
pub const MASTER_STATUS_COLUMN: usize = 12;

static EMPTY_CELL: Value = Value::Null;

/// Renders a cell the way it reads in the sheet. Integral numbers drop the `.0`.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64() {
                format_number(f)
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Numeric cells may come back as numbers or as text such as "1,50,000".
pub fn cell_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

pub fn number_cell(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

pub fn date_cell(date: NaiveDate) -> Value {
    Value::String(date.format(DATE_FORMAT).to_string())
}

pub fn timestamp_cell(timestamp: NaiveDateTime) -> Value {
    Value::String(timestamp.format(TIMESTAMP_FORMAT).to_string())
}

/// Account number of a MASTER row, trimmed.
pub fn account_of(row: &Row) -> String {
    row.get(MASTER_ACCOUNT_COLUMN)
        .map(cell_text)
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub fn status_of(row: &Row) -> Option<DealStatus> {
    row.get(MASTER_STATUS_COLUMN)
        .and_then(|cell| DealStatus::parse(&cell_text(cell)))
}

/// Whole-record substring match over every stored value, case-insensitive.
pub fn row_matches(row: &Row, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    row.iter()
        .any(|cell| cell_text(cell).to_lowercase().contains(&needle))
}

pub fn encode_deal(deal: &Deal) -> Row {
    vec![
        timestamp_cell(deal.timestamp),
        Value::String(deal.type_tag.clone()),
        Value::String(deal.branch.clone()),
        Value::String(deal.customer_name.clone()),
        Value::String(deal.customer_id.clone()),
        Value::String(deal.account_number.clone()),
        number_cell(deal.amount),
        Value::String(deal.scheme_code.clone()),
        number_cell(deal.roi),
        date_cell(deal.maturity_date),
        date_cell(deal.put_date),
        Value::String(deal.certificate_url.clone()),
        Value::String(deal.status.as_str().to_string()),
    ]
}

pub fn decode_deal(row: &Row) -> Result<Deal> {
    let text = |column: usize| row.get(column).map(cell_text).unwrap_or_default();
    let cell = |column: usize| row.get(column).unwrap_or(&EMPTY_CELL);
    let malformed = |column: &str, detail: String| {
        DeskError::store(format!(
            "malformed MASTER row for account '{}': {} {}",
            text(MASTER_ACCOUNT_COLUMN),
            column,
            detail
        ))
    };

    let status_text = text(MASTER_STATUS_COLUMN);
    let status = DealStatus::parse(&status_text)
        .ok_or_else(|| malformed("status", format!("'{}' is not OPEN or BOOKED", status_text)))?;

    Ok(Deal {
        timestamp: parse_timestamp(cell(MASTER_TIMESTAMP_COLUMN))
            .ok_or_else(|| malformed("timestamp", format!("'{}'", text(MASTER_TIMESTAMP_COLUMN))))?,
        type_tag: text(MASTER_TYPE_COLUMN),
        branch: text(MASTER_BRANCH_COLUMN),
        customer_name: text(MASTER_CUSTOMER_NAME_COLUMN),
        customer_id: text(MASTER_CUSTOMER_ID_COLUMN),
        account_number: text(MASTER_ACCOUNT_COLUMN).trim().to_string(),
        amount: cell_number(cell(MASTER_AMOUNT_COLUMN))
            .ok_or_else(|| malformed("amount", format!("'{}'", text(MASTER_AMOUNT_COLUMN))))?,
        scheme_code: text(MASTER_SCHEME_COLUMN),
        roi: cell_number(cell(MASTER_ROI_COLUMN))
            .ok_or_else(|| malformed("roi", format!("'{}'", text(MASTER_ROI_COLUMN))))?,
        maturity_date: parse_date(cell(MASTER_MATURITY_COLUMN))
            .ok_or_else(|| malformed("maturity date", format!("'{}'", text(MASTER_MATURITY_COLUMN))))?,
        put_date: parse_date(cell(MASTER_PUT_COLUMN))
            .ok_or_else(|| malformed("put date", format!("'{}'", text(MASTER_PUT_COLUMN))))?,
        certificate_url: text(MASTER_CERTIFICATE_COLUMN),
        status,
    })
}

pub fn encode_bid(bid: &Bid) -> Row {
    vec![
        timestamp_cell(bid.timestamp),
        Value::String(bid.customer_name.clone()),
        Value::String(bid.account_number.clone()),
        number_cell(bid.amount),
        Value::String(bid.scheme_code.clone()),
        number_cell(bid.roi),
        date_cell(bid.maturity_date),
        date_cell(bid.put_date),
        Value::String(bid.origin_branch.clone()),
        Value::String(bid.bidding_branch.clone()),
        Value::String(bid.document_url.clone()),
    ]
}

// 試算表的日期序號以 1899-12-30 為起點
fn sheets_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
}

// 超出日期範圍的序號視為壞資料，不可 panic
fn finite_serial(n: &serde_json::Number) -> Option<f64> {
    n.as_f64().filter(|serial| serial.is_finite())
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d"))
            .ok(),
        Value::Number(n) => {
            let days = TimeDelta::try_days(finite_serial(n)?.trunc() as i64)?;
            sheets_epoch()?.checked_add_signed(days).map(|dt| dt.date())
        }
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok(),
        Value::Number(n) => {
            let seconds = TimeDelta::try_seconds((finite_serial(n)? * 86_400.0).round() as i64)?;
            sheets_epoch()?.checked_add_signed(seconds)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn master_row(account: &str, status: &str) -> Row {
        vec![
            json!("2026-10-01 09:30:00"),
            json!("FIN-CLOSE"),
            json!("Kochi"),
            json!("Asha Menon"),
            json!("CUST-9"),
            json!(account),
            json!(250000),
            json!("FD12"),
            json!(7.25),
            json!("01-04-2027"),
            json!("01-01-2027"),
            json!("https://res.example.com/cert.pdf"),
            json!(status),
        ]
    }

    #[test]
    fn test_decode_master_row() {
        let deal = decode_deal(&master_row(" ACC100 ", "open")).unwrap();

        assert_eq!(deal.account_number, "ACC100");
        assert_eq!(deal.amount, 250000.0);
        assert_eq!(deal.roi, 7.25);
        assert_eq!(deal.maturity_date, NaiveDate::from_ymd_opt(2027, 4, 1).unwrap());
        assert_eq!(deal.status, DealStatus::Open);
    }

    #[test]
    fn test_encode_uses_stored_formats() {
        let deal = decode_deal(&master_row("ACC100", "OPEN")).unwrap();
        let row = encode_deal(&deal);

        assert_eq!(row.len(), 13);
        assert_eq!(row[MASTER_AMOUNT_COLUMN], json!(250000));
        assert_eq!(row[MASTER_MATURITY_COLUMN], json!("01-04-2027"));
        assert_eq!(row[MASTER_STATUS_COLUMN], json!("OPEN"));
        assert_eq!(row[MASTER_TIMESTAMP_COLUMN], json!("2026-10-01 09:30:00"));
    }

    #[test]
    fn test_decode_rejects_unknown_status() {
        let err = decode_deal(&master_row("ACC7", "CANCELLED")).unwrap_err();
        assert!(err.to_string().contains("ACC7"));
    }

    #[test]
    fn test_decode_tolerates_sheet_native_values() {
        let mut row = master_row("ACC5", "BOOKED");
        row[MASTER_AMOUNT_COLUMN] = json!("1,50,000");
        row[MASTER_MATURITY_COLUMN] = json!(46478);

        let deal = decode_deal(&row).unwrap();
        assert_eq!(deal.amount, 150000.0);
        assert_eq!(deal.maturity_date, NaiveDate::from_ymd_opt(2027, 4, 1).unwrap());
    }

    #[test]
    fn test_out_of_range_serials_are_malformed() {
        let mut row = master_row("ACC6", "OPEN");
        row[MASTER_MATURITY_COLUMN] = json!(1e12);
        assert!(decode_deal(&row).is_err());

        let mut row = master_row("ACC6", "OPEN");
        row[MASTER_PUT_COLUMN] = json!(-1e300);
        assert!(decode_deal(&row).is_err());

        let mut row = master_row("ACC6", "OPEN");
        row[MASTER_TIMESTAMP_COLUMN] = json!(9e15);
        assert!(decode_deal(&row).is_err());
    }

    #[test]
    fn test_short_row_is_malformed_not_panic() {
        let row = vec![json!("2026-10-01 09:30:00"), json!("FIN-CLOSE")];
        assert!(decode_deal(&row).is_err());
        assert_eq!(account_of(&row), "");
        assert_eq!(status_of(&row), None);
    }

    #[test]
    fn test_row_matches_any_value() {
        let row = master_row("ACC100", "OPEN");
        assert!(row_matches(&row, "acc100"));
        assert!(row_matches(&row, "asha"));
        assert!(row_matches(&row, "  "));
        assert!(!row_matches(&row, "ACC200"));
    }

    #[test]
    fn test_cell_text_drops_trailing_zero() {
        assert_eq!(cell_text(&json!(5000.0)), "5000");
        assert_eq!(cell_text(&json!(7.5)), "7.5");
        assert_eq!(cell_text(&Value::Null), "");
    }
}
