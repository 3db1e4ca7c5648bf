//! Bulk budget entry from an uploaded spreadsheet.
//!
//! Workbook conversion happens upstream; the rows arrive here as CSV with the
//! columns `Kode GL`, `Nilai RKAP`, `Release (%)`, `Q1`..`Q4`. Each row is
//! imported independently so one bad row never aborts the rest of the batch.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    budget::core::{BudgetUpsert, upsert_budget},
    gl_account::{GlAccount, get_gl_account_by_code},
};

/// One parsed row of the budget template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BudgetImportRow {
    /// The GL account code the budget belongs to.
    #[serde(rename = "Kode GL")]
    pub kode_gl: String,
    /// The proposed budget value.
    #[serde(rename = "Nilai RKAP")]
    pub nilai_rkap: i64,
    /// How much of the RKAP is released, 0-100.
    #[serde(rename = "Release (%)")]
    pub release_percent: f64,
    /// First quarter amount.
    #[serde(rename = "Q1")]
    pub q1: i64,
    /// Second quarter amount.
    #[serde(rename = "Q2")]
    pub q2: i64,
    /// Third quarter amount.
    #[serde(rename = "Q3")]
    pub q3: i64,
    /// Fourth quarter amount.
    #[serde(rename = "Q4")]
    pub q4: i64,
}

/// The outcome of a batch import.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Rows imported.
    pub success: u32,
    /// Rows skipped.
    pub failed: u32,
    /// One message per skipped row.
    pub errors: Vec<String>,
}

/// Parse the uploaded CSV data into budget rows.
///
/// # Errors
/// Returns [Error::InvalidCsv] if the data is not valid CSV or a row does not
/// match the template columns.
pub fn parse_budget_csv(data: &str) -> Result<Vec<BudgetImportRow>, Error> {
    csv::Reader::from_reader(data.as_bytes())
        .deserialize()
        .collect::<Result<Vec<BudgetImportRow>, csv::Error>>()
        .map_err(|error| Error::InvalidCsv(error.to_string()))
}

/// Import budget rows for `year`, one row at a time.
///
/// A row whose GL code is unknown (or that fails validation) is recorded in
/// the summary and skipped; the remaining rows still import.
///
/// # Errors
/// This function will return a [Error::SqlError] only for failures that
/// poison the whole batch, e.g. the database going away.
pub fn import_budget_rows(
    rows: &[BudgetImportRow],
    year: i32,
    connection: &Connection,
) -> Result<ImportSummary, Error> {
    let mut summary = ImportSummary::default();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 2; // 1-based, after the header row.

        let gl_account = match get_gl_account_by_code(row.kode_gl.trim(), connection) {
            Ok(gl_account) => gl_account,
            Err(Error::NotFound) => {
                summary.failed += 1;
                summary
                    .errors
                    .push(format!("row {row_number}: unknown GL code {}", row.kode_gl));
                continue;
            }
            Err(error) => return Err(error),
        };

        let result = upsert_budget(
            BudgetUpsert {
                gl_account_id: gl_account.id,
                year,
                rkap: row.nilai_rkap,
                release_percent: row.release_percent,
                quarterly: Some([row.q1, row.q2, row.q3, row.q4]),
                monthly: None,
            },
            connection,
        );

        match result {
            Ok(_) => summary.success += 1,
            Err(error) => {
                summary.failed += 1;
                summary
                    .errors
                    .push(format!("row {row_number}: {error}"));
            }
        }
    }

    Ok(summary)
}

/// Render the budget entry template: the import columns with one row per GL
/// account, amounts zeroed.
pub fn budget_template_csv(gl_accounts: &[GlAccount]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // Static headers; writing them by hand keeps the order stable.
    writer
        .write_record(["Kode GL", "Nilai RKAP", "Release (%)", "Q1", "Q2", "Q3", "Q4"])
        .expect("writing to a Vec cannot fail");

    for gl_account in gl_accounts {
        writer
            .write_record([gl_account.code.as_str(), "0", "100", "0", "0", "0", "0"])
            .expect("writing to a Vec cannot fail");
    }

    let bytes = writer.into_inner().expect("writing to a Vec cannot fail");
    String::from_utf8(bytes).expect("the template is ASCII")
}

#[cfg(test)]
mod import_tests {
    use rusqlite::Connection;

    use crate::{
        budget::core::find_budget,
        db::initialize,
        gl_account::{NewGlAccount, create_gl_account, list_gl_accounts},
    };

    use super::{import_budget_rows, parse_budget_csv};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_gl_account(conn: &Connection, code: &str) -> i64 {
        create_gl_account(
            NewGlAccount {
                code: code.to_owned(),
                description: "ATK".to_owned(),
                keterangan: String::new(),
            },
            conn,
        )
        .unwrap()
        .id
    }

    const CSV: &str = "\
Kode GL,Nilai RKAP,Release (%),Q1,Q2,Q3,Q4
6101001,1000000,80,200000,200000,200000,200000
9999999,500000,100,125000,125000,125000,125000
";

    #[test]
    fn parses_the_template_columns() {
        let rows = parse_budget_csv(CSV).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kode_gl, "6101001");
        assert_eq!(rows[0].release_percent, 80.0);
        assert_eq!(rows[1].q4, 125_000);
    }

    #[test]
    fn rejects_malformed_data() {
        assert!(parse_budget_csv("Kode GL,Nilai RKAP\nabc").is_err());
    }

    #[test]
    fn unknown_gl_code_is_recorded_without_aborting_the_batch() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        let rows = parse_budget_csv(CSV).unwrap();

        let summary = import_budget_rows(&rows, 2025, &conn).unwrap();

        assert_eq!(summary.success, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("9999999"), "{:?}", summary.errors);

        let budget = find_budget(gl_account_id, 2025, &conn).unwrap().unwrap();
        assert_eq!(budget.total_amount, 800_000);
        assert_eq!(budget.quarterly, [200_000; 4]);
    }

    #[test]
    fn reimport_overwrites_existing_budgets() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        let rows = parse_budget_csv(CSV).unwrap();

        import_budget_rows(&rows, 2025, &conn).unwrap();
        let summary = import_budget_rows(&rows, 2025, &conn).unwrap();

        assert_eq!(summary.success, 1);
        assert!(find_budget(gl_account_id, 2025, &conn).unwrap().is_some());
    }

    #[test]
    fn template_lists_each_account_once() {
        let conn = get_test_connection();
        insert_test_gl_account(&conn, "6101001");
        insert_test_gl_account(&conn, "6101002");
        let accounts = list_gl_accounts(false, &conn).unwrap();

        let template = super::budget_template_csv(&accounts);

        let lines: Vec<&str> = template.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Kode GL"));
        assert!(lines[1].starts_with("6101001"));
    }
}
