//! Defines the core data model and database queries for expenditure
//! transactions.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{GlAccountId, ImprestFundId, TransactionId},
    tax::{JenisPajak, gross_up, split_receipt},
    transaction::status::{
        CompletionCheck, FinanceFields, TaskFlags, TransactionStatus, derive_status_on_create,
        derive_status_on_update, derive_task_flags,
    },
};

// ============================================================================
// MODELS
// ============================================================================

/// The procurement channel a transaction went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JenisPengadaan {
    /// The PadiUMKM marketplace.
    #[serde(rename = "PadiUMKM")]
    PadiUmkm,
    /// Paid out of an imprest fund.
    InpresFund,
    /// A purchase-order agreement.
    Nopes,
    /// Anything else.
    Lainnya,
}

impl JenisPengadaan {
    /// The canonical string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            JenisPengadaan::PadiUmkm => "PadiUMKM",
            JenisPengadaan::InpresFund => "InpresFund",
            JenisPengadaan::Nopes => "Nopes",
            JenisPengadaan::Lainnya => "Lainnya",
        }
    }
}

impl ToSql for JenisPengadaan {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for JenisPengadaan {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "PadiUMKM" => Ok(JenisPengadaan::PadiUmkm),
            "InpresFund" => Ok(JenisPengadaan::InpresFund),
            "Nopes" => Ok(JenisPengadaan::Nopes),
            "Lainnya" => Ok(JenisPengadaan::Lainnya),
            other => Err(FromSqlError::Other(
                format!("unknown jenis pengadaan: {other}").into(),
            )),
        }
    }
}

/// An expenditure recorded against a GL account, regional, quarter, and year.
///
/// Either entered manually or generated from an imprest fund item, in which
/// case `imprest_fund_id` points back at the fund.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The GL account the spend is booked under.
    pub gl_account_id: GlAccountId,
    /// The quarter (1-4) the spend is booked under.
    pub quarter: u8,
    /// The regional the spend is booked under.
    pub regional_code: String,
    /// The activity the spend belongs to.
    pub kegiatan: String,
    /// The regional unit that consumed the purchase.
    pub regional_pengguna: String,
    /// The budget year the spend is booked under.
    pub year: i32,
    /// The receipt date; drives the quarter-window aggregation.
    pub tanggal_kwitansi: Option<Date>,
    /// The receipt value, tax included.
    pub nilai_kwitansi: i64,
    /// The tax treatment.
    pub jenis_pajak: Option<JenisPajak>,
    /// The pre-tax value.
    pub nilai_tanpa_ppn: i64,
    /// The tax value.
    pub nilai_ppn: i64,
    /// The procurement channel.
    pub jenis_pengadaan: JenisPengadaan,
    /// The vendor paid, if any.
    pub vendor_id: Option<i64>,
    /// The finance hand-off fields.
    #[serde(flatten)]
    pub finance: FinanceFields,
    /// The checklist flags.
    #[serde(flatten)]
    pub task_flags: TaskFlags,
    /// Where the transaction sits in the hand-off.
    pub status: TransactionStatus,
    /// The fund the transaction was generated from, if any.
    pub imprest_fund_id: Option<ImprestFundId>,
}

/// The payload for recording a transaction.
///
/// `nilai_kwitansi` is the receipt total; the tax portion is carved out of it
/// according to the tax treatment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The GL account the spend is booked under.
    pub gl_account_id: GlAccountId,
    /// The quarter (1-4) the spend is booked under.
    pub quarter: u8,
    /// The regional the spend is booked under.
    pub regional_code: String,
    /// The activity the spend belongs to.
    pub kegiatan: String,
    /// The regional unit that consumed the purchase.
    pub regional_pengguna: String,
    /// The budget year the spend is booked under.
    pub year: i32,
    /// The receipt date.
    #[serde(default)]
    pub tanggal_kwitansi: Option<Date>,
    /// The receipt value, tax included.
    pub nilai_kwitansi: i64,
    /// The tax treatment.
    #[serde(default)]
    pub jenis_pajak: Option<JenisPajak>,
    /// The procurement channel.
    pub jenis_pengadaan: JenisPengadaan,
    /// The vendor paid, if any.
    #[serde(default)]
    pub vendor_id: Option<i64>,
    /// The finance hand-off fields.
    #[serde(flatten)]
    pub finance: FinanceFields,
    /// The checklist flags; the derived three are recomputed regardless.
    #[serde(flatten)]
    pub task_flags: TaskFlags,
    /// The fund the transaction was generated from, if any.
    #[serde(default)]
    pub imprest_fund_id: Option<ImprestFundId>,
}

/// The payload for editing a transaction.
///
/// Unlike [NewTransaction], the entered value is pre-tax and the tax is added
/// on top of it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    /// The GL account the spend is booked under.
    pub gl_account_id: GlAccountId,
    /// The quarter (1-4) the spend is booked under.
    pub quarter: u8,
    /// The regional the spend is booked under.
    pub regional_code: String,
    /// The activity the spend belongs to.
    pub kegiatan: String,
    /// The regional unit that consumed the purchase.
    pub regional_pengguna: String,
    /// The budget year the spend is booked under.
    pub year: i32,
    /// The receipt date.
    #[serde(default)]
    pub tanggal_kwitansi: Option<Date>,
    /// The pre-tax value.
    pub nilai_tanpa_ppn: i64,
    /// The tax treatment.
    #[serde(default)]
    pub jenis_pajak: Option<JenisPajak>,
    /// The procurement channel.
    pub jenis_pengadaan: JenisPengadaan,
    /// The vendor paid, if any.
    #[serde(default)]
    pub vendor_id: Option<i64>,
    /// The finance hand-off fields.
    #[serde(flatten)]
    pub finance: FinanceFields,
    /// The checklist flags; the derived three are recomputed regardless.
    #[serde(flatten)]
    pub task_flags: TaskFlags,
}

/// Filters for listing transactions. Unset filters match everything.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    /// Match a budget year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Match a GL account.
    #[serde(default)]
    pub gl_account_id: Option<GlAccountId>,
    /// Match a regional code.
    #[serde(default)]
    pub regional_code: Option<String>,
    /// Match a quarter.
    #[serde(default)]
    pub quarter: Option<u8>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            gl_account_id INTEGER NOT NULL,
            quarter INTEGER NOT NULL,
            regional_code TEXT NOT NULL,
            kegiatan TEXT NOT NULL,
            regional_pengguna TEXT NOT NULL,
            year INTEGER NOT NULL,
            tanggal_kwitansi TEXT,
            nilai_kwitansi INTEGER NOT NULL,
            jenis_pajak TEXT,
            nilai_tanpa_ppn INTEGER NOT NULL,
            nilai_ppn INTEGER NOT NULL,
            jenis_pengadaan TEXT NOT NULL,
            vendor_id INTEGER,
            no_tiket_mydx TEXT,
            tgl_serah_finance TEXT,
            pic_finance TEXT,
            no_hp_finance TEXT,
            tgl_transfer_vendor TEXT,
            nilai_transfer INTEGER,
            task_pengajuan INTEGER NOT NULL DEFAULT 0,
            task_transfer_vendor INTEGER NOT NULL DEFAULT 0,
            task_terima_berkas INTEGER NOT NULL DEFAULT 0,
            task_upload_mydx INTEGER NOT NULL DEFAULT 0,
            task_serah_finance INTEGER NOT NULL DEFAULT 0,
            task_vendor_dibayar INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            imprest_fund_id INTEGER,
            FOREIGN KEY(gl_account_id) REFERENCES gl_account(id),
            FOREIGN KEY(vendor_id) REFERENCES vendor(id),
            FOREIGN KEY(imprest_fund_id) REFERENCES imprest_fund(id)
        )",
        (),
    )?;

    // Composite index used by the remaining-balance query.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_gl_regional_year
         ON \"transaction\"(gl_account_id, regional_code, year)",
        (),
    )?;

    Ok(())
}

const TRANSACTION_COLUMNS: &str = "id, gl_account_id, quarter, regional_code, kegiatan,
    regional_pengguna, year, tanggal_kwitansi, nilai_kwitansi, jenis_pajak, nilai_tanpa_ppn,
    nilai_ppn, jenis_pengadaan, vendor_id, no_tiket_mydx, tgl_serah_finance, pic_finance,
    no_hp_finance, tgl_transfer_vendor, nilai_transfer, task_pengajuan, task_transfer_vendor,
    task_terima_berkas, task_upload_mydx, task_serah_finance, task_vendor_dibayar, status,
    imprest_fund_id";

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        gl_account_id: row.get(1)?,
        quarter: row.get(2)?,
        regional_code: row.get(3)?,
        kegiatan: row.get(4)?,
        regional_pengguna: row.get(5)?,
        year: row.get(6)?,
        tanggal_kwitansi: row.get(7)?,
        nilai_kwitansi: row.get(8)?,
        jenis_pajak: row.get(9)?,
        nilai_tanpa_ppn: row.get(10)?,
        nilai_ppn: row.get(11)?,
        jenis_pengadaan: row.get(12)?,
        vendor_id: row.get(13)?,
        finance: FinanceFields {
            no_tiket_mydx: row.get(14)?,
            tgl_serah_finance: row.get(15)?,
            pic_finance: row.get(16)?,
            no_hp_finance: row.get(17)?,
            tgl_transfer_vendor: row.get(18)?,
            nilai_transfer: row.get(19)?,
        },
        task_flags: TaskFlags {
            task_pengajuan: row.get(20)?,
            task_transfer_vendor: row.get(21)?,
            task_terima_berkas: row.get(22)?,
            task_upload_mydx: row.get(23)?,
            task_serah_finance: row.get(24)?,
            task_vendor_dibayar: row.get(25)?,
        },
        status: row.get(26)?,
        imprest_fund_id: row.get(27)?,
    })
}

fn map_foreign_key_to_not_found(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::NotFound,
        error => error.into(),
    }
}

/// Create a new transaction.
///
/// The receipt value is split into pre-tax and tax portions, the derived task
/// flags are recomputed, and the status is derived from the finance fields.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidQuarter] if the quarter is outside 1..=4,
/// - [Error::AmountNotPositive] if the receipt value is not positive,
/// - [Error::NotFound] if the GL account, vendor, or fund does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !(1..=4).contains(&new_transaction.quarter) {
        return Err(Error::InvalidQuarter(new_transaction.quarter));
    }
    if new_transaction.nilai_kwitansi <= 0 {
        return Err(Error::AmountNotPositive);
    }

    let finance = new_transaction.finance.normalized();
    let split = split_receipt(new_transaction.jenis_pajak, new_transaction.nilai_kwitansi);
    let task_flags = derive_task_flags(new_transaction.task_flags, &finance);
    let status = derive_status_on_create(&finance);

    let sql = format!(
        "INSERT INTO \"transaction\" (gl_account_id, quarter, regional_code, kegiatan,
            regional_pengguna, year, tanggal_kwitansi, nilai_kwitansi, jenis_pajak,
            nilai_tanpa_ppn, nilai_ppn, jenis_pengadaan, vendor_id, no_tiket_mydx,
            tgl_serah_finance, pic_finance, no_hp_finance, tgl_transfer_vendor, nilai_transfer,
            task_pengajuan, task_transfer_vendor, task_terima_berkas, task_upload_mydx,
            task_serah_finance, task_vendor_dibayar, status, imprest_fund_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
            ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)
         RETURNING {TRANSACTION_COLUMNS}"
    );

    let transaction = connection
        .prepare(&sql)?
        .query_row(
            rusqlite::params![
                new_transaction.gl_account_id,
                new_transaction.quarter,
                new_transaction.regional_code,
                new_transaction.kegiatan,
                new_transaction.regional_pengguna,
                new_transaction.year,
                new_transaction.tanggal_kwitansi,
                new_transaction.nilai_kwitansi,
                new_transaction.jenis_pajak,
                split.nilai_tanpa_ppn,
                split.nilai_ppn,
                new_transaction.jenis_pengadaan,
                new_transaction.vendor_id,
                finance.no_tiket_mydx,
                finance.tgl_serah_finance,
                finance.pic_finance,
                finance.no_hp_finance,
                finance.tgl_transfer_vendor,
                finance.nilai_transfer,
                task_flags.task_pengajuan,
                task_flags.task_transfer_vendor,
                task_flags.task_terima_berkas,
                task_flags.task_upload_mydx,
                task_flags.task_serah_finance,
                task_flags.task_vendor_dibayar,
                status,
                new_transaction.imprest_fund_id,
            ],
            map_transaction_row,
        )
        .map_err(map_foreign_key_to_not_found)?;

    Ok(transaction)
}

/// Overwrite a transaction.
///
/// The entered value is pre-tax and grossed up with the tax on top — the
/// inverse of the create path's convention. The status is re-derived: `Close`
/// when everything is complete, otherwise `Proses`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidQuarter] if the quarter is outside 1..=4,
/// - [Error::NotFound] if the transaction, GL account, or vendor does not
///   exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !(1..=4).contains(&update.quarter) {
        return Err(Error::InvalidQuarter(update.quarter));
    }

    let finance = update.finance.normalized();
    let grossed = gross_up(update.jenis_pajak, update.nilai_tanpa_ppn);
    let task_flags = derive_task_flags(update.task_flags, &finance);
    let status = derive_status_on_update(CompletionCheck {
        quarter: update.quarter,
        regional_code: &update.regional_code,
        kegiatan: &update.kegiatan,
        regional_pengguna: &update.regional_pengguna,
        has_tanggal_kwitansi: update.tanggal_kwitansi.is_some(),
        nilai_tanpa_ppn: grossed.nilai_tanpa_ppn,
        has_jenis_pajak: update.jenis_pajak.is_some(),
        has_vendor: update.vendor_id.is_some(),
        finance: &finance,
        task_flags,
    });

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\" SET
                gl_account_id = ?1, quarter = ?2, regional_code = ?3, kegiatan = ?4,
                regional_pengguna = ?5, year = ?6, tanggal_kwitansi = ?7, nilai_kwitansi = ?8,
                jenis_pajak = ?9, nilai_tanpa_ppn = ?10, nilai_ppn = ?11, jenis_pengadaan = ?12,
                vendor_id = ?13, no_tiket_mydx = ?14, tgl_serah_finance = ?15, pic_finance = ?16,
                no_hp_finance = ?17, tgl_transfer_vendor = ?18, nilai_transfer = ?19,
                task_pengajuan = ?20, task_transfer_vendor = ?21, task_terima_berkas = ?22,
                task_upload_mydx = ?23, task_serah_finance = ?24, task_vendor_dibayar = ?25,
                status = ?26
             WHERE id = ?27",
            rusqlite::params![
                update.gl_account_id,
                update.quarter,
                update.regional_code,
                update.kegiatan,
                update.regional_pengguna,
                update.year,
                update.tanggal_kwitansi,
                grossed.nilai_kwitansi,
                update.jenis_pajak,
                grossed.nilai_tanpa_ppn,
                grossed.nilai_ppn,
                update.jenis_pengadaan,
                update.vendor_id,
                finance.no_tiket_mydx,
                finance.tgl_serah_finance,
                finance.pic_finance,
                finance.no_hp_finance,
                finance.tgl_transfer_vendor,
                finance.nilai_transfer,
                task_flags.task_pengajuan,
                task_flags.task_transfer_vendor,
                task_flags.task_terima_berkas,
                task_flags.task_upload_mydx,
                task_flags.task_serah_finance,
                task_flags.task_vendor_dibayar,
                status,
                id,
            ],
        )
        .map_err(map_foreign_key_to_not_found)?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_transaction(id, connection)
}

/// Retrieve a transaction by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id");

    let transaction = connection
        .prepare(&sql)?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// List transactions matching `filter`, newest receipt first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
         WHERE (:year IS NULL OR year = :year)
           AND (:gl_account_id IS NULL OR gl_account_id = :gl_account_id)
           AND (:regional_code IS NULL OR regional_code = :regional_code)
           AND (:quarter IS NULL OR quarter = :quarter)
         ORDER BY tanggal_kwitansi DESC, id DESC"
    );

    connection
        .prepare(&sql)?
        .query_map(
            &[
                (":year", &filter.year as &dyn rusqlite::ToSql),
                (":gl_account_id", &filter.gl_account_id),
                (":regional_code", &filter.regional_code),
                (":quarter", &filter.quarter),
            ],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// List the transactions generated from a fund.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions_for_fund(
    imprest_fund_id: ImprestFundId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
         WHERE imprest_fund_id = :imprest_fund_id
         ORDER BY id"
    );

    connection
        .prepare(&sql)?
        .query_map(
            &[(":imprest_fund_id", &imprest_fund_id)],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete a transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Overwrite the status, finance fields, and task flags of every transaction
/// generated from a fund — the fund-to-transaction fan-out sync.
///
/// The fund is authoritative for its projections; this is the only write path
/// that touches fund-linked transactions in bulk.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn sync_transactions_for_fund(
    imprest_fund_id: ImprestFundId,
    status: TransactionStatus,
    finance: &FinanceFields,
    task_flags: TaskFlags,
    connection: &Connection,
) -> Result<usize, Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET
            status = ?1, no_tiket_mydx = ?2, tgl_serah_finance = ?3, pic_finance = ?4,
            no_hp_finance = ?5, tgl_transfer_vendor = ?6, nilai_transfer = ?7,
            task_pengajuan = ?8, task_transfer_vendor = ?9, task_terima_berkas = ?10,
            task_upload_mydx = ?11, task_serah_finance = ?12, task_vendor_dibayar = ?13
         WHERE imprest_fund_id = ?14",
        rusqlite::params![
            status,
            finance.no_tiket_mydx,
            finance.tgl_serah_finance,
            finance.pic_finance,
            finance.no_hp_finance,
            finance.tgl_transfer_vendor,
            finance.nilai_transfer,
            task_flags.task_pengajuan,
            task_flags.task_transfer_vendor,
            task_flags.task_terima_berkas,
            task_flags.task_upload_mydx,
            task_flags.task_serah_finance,
            task_flags.task_vendor_dibayar,
            imprest_fund_id,
        ],
    )?;

    Ok(rows_affected)
}

/// Delete every transaction generated from a fund.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transactions_for_fund(
    imprest_fund_id: ImprestFundId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE imprest_fund_id = :imprest_fund_id",
            &[(":imprest_fund_id", &imprest_fund_id)],
        )
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        gl_account::{NewGlAccount, create_gl_account},
        tax::JenisPajak,
        transaction::status::{FinanceFields, TaskFlags, TransactionStatus},
        vendor::{NewVendor, create_vendor},
    };

    use super::{
        JenisPengadaan, NewTransaction, TransactionFilter, TransactionUpdate, create_transaction,
        delete_transaction, get_transaction, list_transactions, update_transaction,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_gl_account(conn: &Connection) -> i64 {
        create_gl_account(
            NewGlAccount {
                code: "6101001".to_owned(),
                description: "ATK".to_owned(),
                keterangan: String::new(),
            },
            conn,
        )
        .unwrap()
        .id
    }

    fn insert_test_vendor(conn: &Connection) -> i64 {
        create_vendor(
            NewVendor {
                name: "PT Maju".to_owned(),
                alamat: String::new(),
                pic: String::new(),
                phone: String::new(),
                email: String::new(),
            },
            conn,
        )
        .unwrap()
        .id
    }

    fn new_transaction(gl_account_id: i64) -> NewTransaction {
        NewTransaction {
            gl_account_id,
            quarter: 1,
            regional_code: "R1".to_owned(),
            kegiatan: "Pengadaan ATK".to_owned(),
            regional_pengguna: "R1".to_owned(),
            year: 2025,
            tanggal_kwitansi: Some(date!(2025 - 02 - 10)),
            nilai_kwitansi: 111_000,
            jenis_pajak: Some(JenisPajak::Ppn11),
            jenis_pengadaan: JenisPengadaan::Lainnya,
            vendor_id: None,
            finance: FinanceFields::default(),
            task_flags: TaskFlags::default(),
            imprest_fund_id: None,
        }
    }

    #[test]
    fn create_splits_the_receipt_and_starts_open() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);

        let transaction = create_transaction(new_transaction(gl_account_id), &conn).unwrap();

        assert_eq!(transaction.nilai_kwitansi, 111_000);
        assert_eq!(transaction.nilai_tanpa_ppn, 100_000);
        assert_eq!(transaction.nilai_ppn, 11_000);
        assert_eq!(transaction.status, TransactionStatus::Open);
    }

    #[test]
    fn create_with_mydx_ticket_starts_proses() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        let mut payload = new_transaction(gl_account_id);
        payload.finance.no_tiket_mydx = Some("MYDX-7".to_owned());

        let transaction = create_transaction(payload, &conn).unwrap();

        assert_eq!(transaction.status, TransactionStatus::Proses);
        assert!(transaction.task_flags.task_upload_mydx);
    }

    #[test]
    fn create_rejects_a_non_positive_receipt() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        let mut payload = new_transaction(gl_account_id);
        payload.nilai_kwitansi = 0;

        assert_eq!(
            create_transaction(payload, &conn),
            Err(Error::AmountNotPositive)
        );
    }

    #[test]
    fn create_rejects_an_unknown_gl_account() {
        let conn = get_test_connection();

        assert_eq!(
            create_transaction(new_transaction(42), &conn),
            Err(Error::NotFound)
        );
    }

    fn complete_update(gl_account_id: i64, vendor_id: i64) -> TransactionUpdate {
        TransactionUpdate {
            gl_account_id,
            quarter: 1,
            regional_code: "R1".to_owned(),
            kegiatan: "Pengadaan ATK".to_owned(),
            regional_pengguna: "R1".to_owned(),
            year: 2025,
            tanggal_kwitansi: Some(date!(2025 - 02 - 10)),
            nilai_tanpa_ppn: 100_000,
            jenis_pajak: Some(JenisPajak::Ppn11),
            jenis_pengadaan: JenisPengadaan::Lainnya,
            vendor_id: Some(vendor_id),
            finance: FinanceFields {
                no_tiket_mydx: Some("MYDX-7".to_owned()),
                tgl_serah_finance: Some(date!(2025 - 02 - 12)),
                pic_finance: Some("Rina".to_owned()),
                no_hp_finance: Some("0812000111".to_owned()),
                tgl_transfer_vendor: Some(date!(2025 - 02 - 20)),
                nilai_transfer: Some(111_000),
            },
            task_flags: TaskFlags {
                task_pengajuan: true,
                task_transfer_vendor: true,
                task_terima_berkas: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn update_grosses_up_the_pre_tax_value() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        let created = create_transaction(new_transaction(gl_account_id), &conn).unwrap();
        let vendor_id = insert_test_vendor(&conn);

        let updated =
            update_transaction(created.id, complete_update(gl_account_id, vendor_id), &conn)
                .unwrap();

        // The update path adds the tax on top of the entered value, unlike
        // the create path which carved it out of the same number.
        assert_eq!(updated.nilai_tanpa_ppn, 100_000);
        assert_eq!(updated.nilai_ppn, 11_000);
        assert_eq!(updated.nilai_kwitansi, 111_000);
    }

    #[test]
    fn update_with_everything_complete_closes() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        let created = create_transaction(new_transaction(gl_account_id), &conn).unwrap();
        let vendor_id = insert_test_vendor(&conn);

        let updated =
            update_transaction(created.id, complete_update(gl_account_id, vendor_id), &conn)
                .unwrap();

        assert_eq!(updated.status, TransactionStatus::Close);
        assert!(updated.task_flags.all_done());
    }

    #[test]
    fn update_with_a_gap_lands_on_proses() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        let created = create_transaction(new_transaction(gl_account_id), &conn).unwrap();

        let mut update = complete_update(gl_account_id, 1);
        update.vendor_id = None;
        update.finance.nilai_transfer = None;
        let updated = update_transaction(created.id, update, &conn).unwrap();

        assert_eq!(updated.status, TransactionStatus::Proses);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        let vendor_id = insert_test_vendor(&conn);

        let result = update_transaction(42, complete_update(gl_account_id, vendor_id), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_the_transaction() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        let transaction = create_transaction(new_transaction(gl_account_id), &conn).unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
        assert_eq!(
            delete_transaction(transaction.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn listing_filters_by_year_and_regional() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn);
        create_transaction(new_transaction(gl_account_id), &conn).unwrap();
        let mut other = new_transaction(gl_account_id);
        other.regional_code = "R2".to_owned();
        other.year = 2024;
        create_transaction(other, &conn).unwrap();

        let all = list_transactions(&TransactionFilter::default(), &conn).unwrap();
        assert_eq!(all.len(), 2);

        let r1_2025 = list_transactions(
            &TransactionFilter {
                year: Some(2025),
                regional_code: Some("R1".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();
        assert_eq!(r1_2025.len(), 1);
        assert_eq!(r1_2025[0].regional_code, "R1");
    }
}
