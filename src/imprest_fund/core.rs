//! Defines the core data model and database queries for imprest funds and
//! their spend items.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{CardId, DatabaseId, GlAccountId, ImprestFundId},
    transaction::status::{FinanceFields, TaskFlags},
};

/// Where a fund request sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundStatus {
    /// Being put together; no money has moved.
    Draft,
    /// Approved and disbursed; transactions exist and the card is debited.
    Open,
    /// In the finance hand-off.
    Proses,
    /// Settled by finance.
    Close,
}

impl FundStatus {
    /// The canonical string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            FundStatus::Draft => "draft",
            FundStatus::Open => "open",
            FundStatus::Proses => "proses",
            FundStatus::Close => "close",
        }
    }
}

impl ToSql for FundStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FundStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "draft" => Ok(FundStatus::Draft),
            "open" => Ok(FundStatus::Open),
            "proses" => Ok(FundStatus::Proses),
            "close" => Ok(FundStatus::Close),
            other => Err(FromSqlError::Other(
                format!("unknown fund status: {other}").into(),
            )),
        }
    }
}

/// A fund request / disbursement record.
///
/// A top-up is stored as a degenerate closed fund with no items and a
/// non-zero `debit`, so it shows up in the same history as real
/// disbursements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprestFund {
    /// The id for the fund.
    pub id: ImprestFundId,
    /// The activity group the request is for.
    pub kelompok_kegiatan: String,
    /// The regional the spend is booked under; required before leaving
    /// draft.
    pub regional_code: Option<String>,
    /// The card the fund draws on, if any.
    pub imprest_fund_card_id: Option<CardId>,
    /// Where the request sits in its lifecycle.
    pub status: FundStatus,
    /// The sum of the items' amounts.
    pub total_amount: i64,
    /// The top-up amount; zero for normal requests.
    pub debit: i64,
    /// The finance hand-off fields.
    #[serde(flatten)]
    pub finance: FinanceFields,
    /// The checklist flags.
    #[serde(flatten)]
    pub task_flags: TaskFlags,
}

/// One spend line within a fund.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprestItem {
    /// The id for the item.
    pub id: DatabaseId,
    /// The fund the item belongs to.
    pub imprest_fund_id: ImprestFundId,
    /// When the money was spent.
    pub tanggal: Date,
    /// What the money was spent on.
    pub uraian: String,
    /// The GL account the spend is booked under.
    pub gl_account_id: GlAccountId,
    /// The regional unit that consumed the purchase, if different from the
    /// fund's regional.
    pub area_pengguna: Option<String>,
    /// The amount spent.
    pub jumlah: i64,
}

/// The payload for one spend line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImprestItem {
    /// When the money was spent.
    pub tanggal: Date,
    /// What the money was spent on.
    pub uraian: String,
    /// The GL account the spend is booked under.
    pub gl_account_id: GlAccountId,
    /// The regional unit that consumed the purchase.
    #[serde(default)]
    pub area_pengguna: Option<String>,
    /// The amount spent.
    pub jumlah: i64,
}

/// The field set written to a fund row; shared by insert and update.
#[derive(Debug, Clone)]
pub struct FundRow {
    /// The activity group the request is for.
    pub kelompok_kegiatan: String,
    /// The regional the spend is booked under.
    pub regional_code: Option<String>,
    /// The card the fund draws on.
    pub imprest_fund_card_id: Option<CardId>,
    /// The fund's status.
    pub status: FundStatus,
    /// The sum of the items' amounts.
    pub total_amount: i64,
    /// The top-up amount.
    pub debit: i64,
    /// The finance hand-off fields.
    pub finance: FinanceFields,
    /// The checklist flags.
    pub task_flags: TaskFlags,
}

pub fn create_imprest_fund_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS imprest_fund (
            id INTEGER PRIMARY KEY,
            kelompok_kegiatan TEXT NOT NULL,
            regional_code TEXT,
            imprest_fund_card_id INTEGER,
            status TEXT NOT NULL,
            total_amount INTEGER NOT NULL DEFAULT 0,
            debit INTEGER NOT NULL DEFAULT 0,
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
            FOREIGN KEY(imprest_fund_card_id) REFERENCES imprest_fund_card(id)
        )",
        (),
    )?;

    Ok(())
}

pub fn create_imprest_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS imprest_item (
            id INTEGER PRIMARY KEY,
            imprest_fund_id INTEGER NOT NULL,
            tanggal TEXT NOT NULL,
            uraian TEXT NOT NULL,
            gl_account_id INTEGER NOT NULL,
            area_pengguna TEXT,
            jumlah INTEGER NOT NULL,
            FOREIGN KEY(imprest_fund_id) REFERENCES imprest_fund(id) ON DELETE CASCADE,
            FOREIGN KEY(gl_account_id) REFERENCES gl_account(id)
        )",
        (),
    )?;

    Ok(())
}

const FUND_COLUMNS: &str = "id, kelompok_kegiatan, regional_code, imprest_fund_card_id, status,
    total_amount, debit, no_tiket_mydx, tgl_serah_finance, pic_finance, no_hp_finance,
    tgl_transfer_vendor, nilai_transfer, task_pengajuan, task_transfer_vendor,
    task_terima_berkas, task_upload_mydx, task_serah_finance, task_vendor_dibayar";

pub fn map_row_to_fund(row: &Row) -> Result<ImprestFund, rusqlite::Error> {
    Ok(ImprestFund {
        id: row.get(0)?,
        kelompok_kegiatan: row.get(1)?,
        regional_code: row.get(2)?,
        imprest_fund_card_id: row.get(3)?,
        status: row.get(4)?,
        total_amount: row.get(5)?,
        debit: row.get(6)?,
        finance: FinanceFields {
            no_tiket_mydx: row.get(7)?,
            tgl_serah_finance: row.get(8)?,
            pic_finance: row.get(9)?,
            no_hp_finance: row.get(10)?,
            tgl_transfer_vendor: row.get(11)?,
            nilai_transfer: row.get(12)?,
        },
        task_flags: TaskFlags {
            task_pengajuan: row.get(13)?,
            task_transfer_vendor: row.get(14)?,
            task_terima_berkas: row.get(15)?,
            task_upload_mydx: row.get(16)?,
            task_serah_finance: row.get(17)?,
            task_vendor_dibayar: row.get(18)?,
        },
    })
}

pub fn map_row_to_item(row: &Row) -> Result<ImprestItem, rusqlite::Error> {
    Ok(ImprestItem {
        id: row.get(0)?,
        imprest_fund_id: row.get(1)?,
        tanggal: row.get(2)?,
        uraian: row.get(3)?,
        gl_account_id: row.get(4)?,
        area_pengguna: row.get(5)?,
        jumlah: row.get(6)?,
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

/// Insert a fund row. Lifecycle orchestration lives in
/// [crate::imprest_fund::lifecycle]; this only writes the record.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the referenced card does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn insert_fund(fund: &FundRow, connection: &Connection) -> Result<ImprestFund, Error> {
    let sql = format!(
        "INSERT INTO imprest_fund (kelompok_kegiatan, regional_code, imprest_fund_card_id,
            status, total_amount, debit, no_tiket_mydx, tgl_serah_finance, pic_finance,
            no_hp_finance, tgl_transfer_vendor, nilai_transfer, task_pengajuan,
            task_transfer_vendor, task_terima_berkas, task_upload_mydx, task_serah_finance,
            task_vendor_dibayar)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
         RETURNING {FUND_COLUMNS}"
    );

    let fund = connection
        .prepare(&sql)?
        .query_row(
            rusqlite::params![
                fund.kelompok_kegiatan,
                fund.regional_code,
                fund.imprest_fund_card_id,
                fund.status,
                fund.total_amount,
                fund.debit,
                fund.finance.no_tiket_mydx,
                fund.finance.tgl_serah_finance,
                fund.finance.pic_finance,
                fund.finance.no_hp_finance,
                fund.finance.tgl_transfer_vendor,
                fund.finance.nilai_transfer,
                fund.task_flags.task_pengajuan,
                fund.task_flags.task_transfer_vendor,
                fund.task_flags.task_terima_berkas,
                fund.task_flags.task_upload_mydx,
                fund.task_flags.task_serah_finance,
                fund.task_flags.task_vendor_dibayar,
            ],
            map_row_to_fund,
        )
        .map_err(map_foreign_key_to_not_found)?;

    Ok(fund)
}

/// Overwrite a fund row. Lifecycle orchestration lives in
/// [crate::imprest_fund::lifecycle]; this only writes the record.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the fund or referenced card does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_fund_row(
    id: ImprestFundId,
    fund: &FundRow,
    connection: &Connection,
) -> Result<ImprestFund, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE imprest_fund SET
                kelompok_kegiatan = ?1, regional_code = ?2, imprest_fund_card_id = ?3,
                status = ?4, total_amount = ?5, debit = ?6, no_tiket_mydx = ?7,
                tgl_serah_finance = ?8, pic_finance = ?9, no_hp_finance = ?10,
                tgl_transfer_vendor = ?11, nilai_transfer = ?12, task_pengajuan = ?13,
                task_transfer_vendor = ?14, task_terima_berkas = ?15, task_upload_mydx = ?16,
                task_serah_finance = ?17, task_vendor_dibayar = ?18
             WHERE id = ?19",
            rusqlite::params![
                fund.kelompok_kegiatan,
                fund.regional_code,
                fund.imprest_fund_card_id,
                fund.status,
                fund.total_amount,
                fund.debit,
                fund.finance.no_tiket_mydx,
                fund.finance.tgl_serah_finance,
                fund.finance.pic_finance,
                fund.finance.no_hp_finance,
                fund.finance.tgl_transfer_vendor,
                fund.finance.nilai_transfer,
                fund.task_flags.task_pengajuan,
                fund.task_flags.task_transfer_vendor,
                fund.task_flags.task_terima_berkas,
                fund.task_flags.task_upload_mydx,
                fund.task_flags.task_serah_finance,
                fund.task_flags.task_vendor_dibayar,
                id,
            ],
        )
        .map_err(map_foreign_key_to_not_found)?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_fund(id, connection)
}

/// Retrieve a fund by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid fund,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_fund(id: ImprestFundId, connection: &Connection) -> Result<ImprestFund, Error> {
    let sql = format!("SELECT {FUND_COLUMNS} FROM imprest_fund WHERE id = :id");

    let fund = connection
        .prepare(&sql)?
        .query_row(&[(":id", &id)], map_row_to_fund)?;

    Ok(fund)
}

/// List all funds, newest first. Top-ups appear alongside real requests.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_funds(connection: &Connection) -> Result<Vec<ImprestFund>, Error> {
    let sql = format!("SELECT {FUND_COLUMNS} FROM imprest_fund ORDER BY id DESC");

    connection
        .prepare(&sql)?
        .query_map([], map_row_to_fund)?
        .map(|maybe_fund| maybe_fund.map_err(Error::from))
        .collect()
}

/// Replace a fund's items wholesale: delete them all, then recreate from the
/// payload. Item-bearing edits always go through here.
///
/// # Errors
/// This function will return a:
/// - [Error::AmountNotPositive] if an item amount is not positive,
/// - [Error::NotFound] if an item's GL account does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn replace_items(
    imprest_fund_id: ImprestFundId,
    items: &[NewImprestItem],
    connection: &Connection,
) -> Result<Vec<ImprestItem>, Error> {
    connection.execute(
        "DELETE FROM imprest_item WHERE imprest_fund_id = :imprest_fund_id",
        &[(":imprest_fund_id", &imprest_fund_id)],
    )?;

    let mut statement = connection.prepare(
        "INSERT INTO imprest_item (imprest_fund_id, tanggal, uraian, gl_account_id,
            area_pengguna, jumlah)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING id, imprest_fund_id, tanggal, uraian, gl_account_id, area_pengguna, jumlah",
    )?;

    let mut created = Vec::with_capacity(items.len());
    for item in items {
        if item.jumlah <= 0 {
            return Err(Error::AmountNotPositive);
        }

        let item = statement
            .query_row(
                rusqlite::params![
                    imprest_fund_id,
                    item.tanggal,
                    item.uraian,
                    item.gl_account_id,
                    item.area_pengguna,
                    item.jumlah,
                ],
                map_row_to_item,
            )
            .map_err(map_foreign_key_to_not_found)?;
        created.push(item);
    }

    Ok(created)
}

/// List a fund's items in entry order.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_items(
    imprest_fund_id: ImprestFundId,
    connection: &Connection,
) -> Result<Vec<ImprestItem>, Error> {
    connection
        .prepare(
            "SELECT id, imprest_fund_id, tanggal, uraian, gl_account_id, area_pengguna, jumlah
             FROM imprest_item
             WHERE imprest_fund_id = :imprest_fund_id
             ORDER BY id",
        )?
        .query_map(&[(":imprest_fund_id", &imprest_fund_id)], map_row_to_item)?
        .map(|maybe_item| maybe_item.map_err(Error::from))
        .collect()
}

/// Delete a fund row. Its items are removed by the cascade; linked
/// transactions are the caller's responsibility.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid fund,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_fund_row(id: ImprestFundId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM imprest_fund WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The sum of the item amounts — a fund's `total_amount`.
pub fn items_total(items: &[NewImprestItem]) -> i64 {
    items.iter().map(|item| item.jumlah).sum()
}
