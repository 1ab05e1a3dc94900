use anyhow::Result;
use credits_fin::domain::model::{DealStatus, Table, UploadFile};
use credits_fin::domain::ports::RecordStore;
use credits_fin::{DealDesk, DeskError, GoogleSheetsStore, InMemoryBlobStore};
use httpmock::prelude::*;
use serde_json::json;

const SHEET_ID: &str = "sheet-123";
const TOKEN: &str = "ya29.test-token";

fn store(server: &MockServer) -> GoogleSheetsStore {
    GoogleSheetsStore::new(server.base_url(), SHEET_ID, TOKEN)
}

fn values_path(range: &str) -> String {
    format!("/v4/spreadsheets/{}/values/{}", SHEET_ID, range)
}

fn master_row(account: &str, status: &str) -> serde_json::Value {
    json!([
        "2026-10-01 09:30:00", "FIN-CLOSE", "Kochi", "Asha Menon", "CID-1", account,
        250000, "FD12", 7.25, "01-04-2027", "01-01-2027",
        "https://res.cloudinary.com/demo/raw/upload/cert.pdf", status
    ])
}

#[tokio::test]
async fn test_read_rows_skips_header_and_sends_token() -> Result<()> {
    let server = MockServer::start();
    let read_mock = server.mock(|when, then| {
        when.method(GET)
            .path(values_path("MASTER!A2:M"))
            .query_param("valueRenderOption", "UNFORMATTED_VALUE")
            .header("authorization", format!("Bearer {}", TOKEN));
        then.status(200).json_body(json!({
            "range": "MASTER!A2:M3",
            "majorDimension": "ROWS",
            "values": [master_row("ACC100", "OPEN"), master_row("ACC200", "BOOKED")]
        }));
    });

    let rows = store(&server).read_rows(Table::Master).await?;

    read_mock.assert();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][5], json!("ACC200"));
    Ok(())
}

#[tokio::test]
async fn test_empty_sheet_has_no_values_field() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(values_path("BRANCH_BIDS!A2:K"));
        then.status(200)
            .json_body(json!({ "range": "BRANCH_BIDS!A2:K1000", "majorDimension": "ROWS" }));
    });

    let rows = store(&server).read_rows(Table::BranchBids).await?;
    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_append_row_posts_raw_values() -> Result<()> {
    let server = MockServer::start();
    let append_mock = server.mock(|when, then| {
        when.method(POST)
            .path(values_path("BRANCH_BIDS!A1:append"))
            .query_param("valueInputOption", "RAW")
            .query_param("insertDataOption", "INSERT_ROWS")
            .json_body(json!({ "values": [["2026-10-02 10:00:00", "ACC100"]] }));
        then.status(200).json_body(json!({ "updates": { "updatedRows": 1 } }));
    });

    store(&server)
        .append_row(
            Table::BranchBids,
            vec![json!("2026-10-02 10:00:00"), json!("ACC100")],
        )
        .await?;

    append_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_compare_and_set_writes_status_column() -> Result<()> {
    let server = MockServer::start();
    let read_cell = server.mock(|when, then| {
        when.method(GET).path(values_path("MASTER!M3"));
        then.status(200).json_body(json!({ "values": [["OPEN"]] }));
    });
    let write_cell = server.mock(|when, then| {
        when.method(PUT)
            .path(values_path("MASTER!M3"))
            .query_param("valueInputOption", "RAW")
            .json_body(json!({ "range": "MASTER!M3", "values": [["BOOKED"]] }));
        then.status(200).json_body(json!({ "updatedCells": 1 }));
    });

    let written = store(&server)
        .compare_and_set_cell(Table::Master, 1, 12, "OPEN", json!("BOOKED"))
        .await?;

    assert!(written);
    read_cell.assert();
    write_cell.assert();
    Ok(())
}

#[tokio::test]
async fn test_compare_and_set_skips_write_on_mismatch() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(values_path("MASTER!M2"));
        then.status(200).json_body(json!({ "values": [["BOOKED"]] }));
    });
    let write_cell = server.mock(|when, then| {
        when.method(PUT).path(values_path("MASTER!M2"));
        then.status(200);
    });

    let written = store(&server)
        .compare_and_set_cell(Table::Master, 0, 12, "OPEN", json!("BOOKED"))
        .await?;

    assert!(!written);
    assert_eq!(write_cell.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn test_http_failure_is_store_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(values_path("BRANCHES!A2:A"));
        then.status(403).body("The caller does not have permission");
    });

    let err = store(&server).read_rows(Table::Branches).await.unwrap_err();

    assert!(matches!(err, DeskError::StoreError { .. }));
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_place_bid_against_sheets() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(values_path("BRANCHES!A2:A"));
        then.status(200)
            .json_body(json!({ "values": [["Kochi"], ["Thrissur"]] }));
    });
    server.mock(|when, then| {
        when.method(GET).path(values_path("MASTER!A2:M"));
        then.status(200).json_body(json!({
            "values": [master_row("ACC050", "BOOKED"), master_row("ACC100", "open")]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path(values_path("MASTER!M3"));
        then.status(200).json_body(json!({ "values": [["open"]] }));
    });
    let book = server.mock(|when, then| {
        when.method(PUT)
            .path(values_path("MASTER!M3"))
            .json_body(json!({ "range": "MASTER!M3", "values": [["BOOKED"]] }));
        then.status(200).json_body(json!({}));
    });
    let append_bid = server.mock(|when, then| {
        when.method(POST)
            .path(values_path("BRANCH_BIDS!A1:append"))
            .body_contains("\"Thrissur\"")
            .body_contains("\"ACC100\"");
        then.status(200).json_body(json!({}));
    });

    let desk = DealDesk::new(store(&server), InMemoryBlobStore::new());
    let bid = desk
        .place_bid(
            "ACC100",
            "Thrissur",
            Some(UploadFile::new("offer.pdf", b"%PDF".to_vec())),
        )
        .await?;

    assert_eq!(bid.origin_branch, "Kochi");
    book.assert();
    append_bid.assert();

    let open = desk.list_open_deals(None).await?;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].status, DealStatus::Open);
    Ok(())
}
