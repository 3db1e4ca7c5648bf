//! End-to-end tests driving the real router over HTTP.

use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};
use time::OffsetDateTime;

use anggaran_rs::{AppState, build_router};

fn test_server() -> TestServer {
    let connection = Connection::open_in_memory().unwrap();
    let attachment_dir = std::env::temp_dir().join("anggaran_api_tests");
    let state = AppState::new(connection, "Etc/UTC", attachment_dir).unwrap();

    TestServer::new(build_router(state))
}

/// The (year, quarter, today) the server will consider current.
fn current_period() -> (i32, u8, String) {
    let today = OffsetDateTime::now_utc().date();
    let quarter = (today.month() as u8 - 1) / 3 + 1;

    (today.year(), quarter, today.to_string())
}

#[tokio::test]
async fn fund_lifecycle_moves_the_card_saldo() {
    let server = test_server();
    let (year, quarter, today) = current_period();

    let gl_account = server
        .post("/api/gl_accounts")
        .json(&json!({"code": "6101001", "description": "ATK"}))
        .await;
    gl_account.assert_status(StatusCode::CREATED);
    let gl_account_id = gl_account.json::<Value>()["id"].as_i64().unwrap();

    server
        .post("/api/regionals")
        .json(&json!({"code": "R1", "name": "Regional 1"}))
        .await
        .assert_status(StatusCode::CREATED);

    let card = server
        .post("/api/cards")
        .json(&json!({"nomorKartu": "KK-001", "user": "Budi", "saldo": 5_000_000}))
        .await;
    card.assert_status(StatusCode::CREATED);
    let card_id = card.json::<Value>()["id"].as_i64().unwrap();

    let budget = server
        .post("/api/budgets")
        .json(&json!({
            "glAccountId": gl_account_id,
            "year": year,
            "rkap": 4_000_000,
            "releasePercent": 100.0,
        }))
        .await;
    budget.assert_status_ok();
    let budget_json = budget.json::<Value>();
    let budget_id = budget_json["id"].as_i64().unwrap();
    assert_eq!(budget_json["totalAmount"], json!(4_000_000));
    assert_eq!(
        budget_json["quarterly"],
        json!([1_000_000, 1_000_000, 1_000_000, 1_000_000])
    );

    server
        .put(&format!("/api/budgets/{budget_id}/allocations/{quarter}"))
        .json(&json!({
            "mode": "percentage",
            "entries": [{"regionalCode": "R1"}],
        }))
        .await
        .assert_status_ok();

    let fund = server
        .post("/api/imprest_funds")
        .json(&json!({
            "kelompokKegiatan": "Operasional Kantor",
            "regionalCode": "R1",
            "imprestFundCardId": card_id,
            "status": "open",
            "items": [
                {"tanggal": today, "uraian": "Beli ATK", "glAccountId": gl_account_id, "jumlah": 600_000},
            ],
        }))
        .await;
    fund.assert_status(StatusCode::CREATED);
    let fund_json = fund.json::<Value>();
    let fund_id = fund_json["id"].as_i64().unwrap();
    assert_eq!(fund_json["totalAmount"], json!(600_000));

    // Opening debited the card.
    let cards = server.get("/api/cards").await.json::<Value>();
    assert_eq!(cards[0]["saldo"], json!(4_400_000));

    // The generated transaction counts as spend in the remaining balance.
    let remaining = server
        .get(&format!(
            "/api/remaining?glAccountId={gl_account_id}&regionalCode=R1&quarter={quarter}&year={year}"
        ))
        .await
        .json::<Value>();
    assert_eq!(remaining["allocated"], json!(1_000_000));
    assert_eq!(remaining["used"], json!(600_000));
    assert_eq!(remaining["remaining"], json!(400_000));

    // The fund view lists the generated transaction.
    let fund_view = server
        .get(&format!("/api/imprest_funds/{fund_id}"))
        .await
        .json::<Value>();
    assert_eq!(fund_view["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(fund_view["transactions"][0]["status"], json!("Open"));
    assert_eq!(
        fund_view["transactions"][0]["jenisPengadaan"],
        json!("InpresFund")
    );

    // Top-up credits the card and shows up in the fund history.
    server
        .post(&format!("/api/cards/{card_id}/top_up"))
        .json(&json!({"amount": 100_000}))
        .await
        .assert_status(StatusCode::CREATED);
    let cards = server.get("/api/cards").await.json::<Value>();
    assert_eq!(cards[0]["saldo"], json!(4_500_000));

    let funds = server.get("/api/imprest_funds").await.json::<Value>();
    assert_eq!(funds.as_array().unwrap().len(), 2);

    // Deleting the open fund returns its full debit and removes the
    // generated transactions.
    server
        .delete(&format!("/api/imprest_funds/{fund_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let cards = server.get("/api/cards").await.json::<Value>();
    assert_eq!(cards[0]["saldo"], json!(5_100_000));

    let transactions = server.get("/api/transactions").await.json::<Value>();
    assert!(transactions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn opening_a_fund_against_a_short_allocation_is_a_conflict() {
    let server = test_server();
    let (year, quarter, today) = current_period();

    let gl_account_id = server
        .post("/api/gl_accounts")
        .json(&json!({"code": "6101001", "description": "ATK"}))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();

    let budget_id = server
        .post("/api/budgets")
        .json(&json!({
            "glAccountId": gl_account_id,
            "year": year,
            "rkap": 400_000,
            "releasePercent": 100.0,
        }))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();
    server
        .put(&format!("/api/budgets/{budget_id}/allocations/{quarter}"))
        .json(&json!({"mode": "percentage", "entries": [{"regionalCode": "R1"}]}))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/imprest_funds")
        .json(&json!({
            "kelompokKegiatan": "Operasional",
            "regionalCode": "R1",
            "status": "open",
            "items": [
                {"tanggal": today, "uraian": "Beli ATK", "glAccountId": gl_account_id, "jumlah": 600_000},
            ],
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().unwrap().contains("insufficient"));

    // Nothing was persisted.
    let funds = server.get("/api/imprest_funds").await.json::<Value>();
    assert!(funds.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_master_data_codes_are_conflicts() {
    let server = test_server();

    let payload = json!({"code": "6101001", "description": "ATK"});
    server
        .post("/api/gl_accounts")
        .json(&payload)
        .await
        .assert_status(StatusCode::CREATED);

    let duplicate = server.post("/api/gl_accounts").json(&payload).await;
    duplicate.assert_status(StatusCode::CONFLICT);

    server
        .post("/api/cards")
        .json(&json!({"nomorKartu": "KK-1", "user": "Budi"}))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/cards")
        .json(&json!({"nomorKartu": "KK-1", "user": "Siti"}))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn budget_import_skips_bad_rows_and_keeps_good_ones() {
    let server = test_server();
    let (year, _, _) = current_period();

    server
        .post("/api/gl_accounts")
        .json(&json!({"code": "6101001", "description": "ATK"}))
        .await
        .assert_status(StatusCode::CREATED);

    let csv = "\
Kode GL,Nilai RKAP,Release (%),Q1,Q2,Q3,Q4
6101001,1000000,80,200000,200000,200000,200000
9999999,500000,100,125000,125000,125000,125000
";

    let response = server
        .post(&format!("/api/budgets/import?year={year}"))
        .multipart(
            axum_test::multipart::MultipartForm::new().add_part(
                "file",
                axum_test::multipart::Part::bytes(csv.as_bytes().to_vec())
                    .file_name("anggaran.csv")
                    .mime_type("text/csv"),
            ),
        )
        .await;

    response.assert_status_ok();
    let summary = response.json::<Value>();
    assert_eq!(summary["success"], json!(1));
    assert_eq!(summary["failed"], json!(1));
    assert!(summary["errors"][0].as_str().unwrap().contains("9999999"));

    let budgets = server
        .get(&format!("/api/budgets?year={year}"))
        .await
        .json::<Value>();
    assert_eq!(budgets.as_array().unwrap().len(), 1);
    assert_eq!(budgets[0]["totalAmount"], json!(800_000));
}

#[tokio::test]
async fn the_template_downloads_with_its_fixed_name() {
    let server = test_server();

    server
        .post("/api/gl_accounts")
        .json(&json!({"code": "6101001", "description": "ATK"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/budgets/template").await;

    response.assert_status_ok();
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("template_anggaran.csv"));
    assert!(response.text().starts_with("Kode GL,"));
}
