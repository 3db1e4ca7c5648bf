use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::{DatabaseId, KaryawanId}};

/// An employee with a petty cash ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Karyawan {
    /// The id for the employee.
    pub id: KaryawanId,
    /// The unique employee number.
    pub nik: String,
    /// The employee's name.
    pub name: String,
    /// Job title.
    pub jabatan: String,
    /// Whether the employee is still active.
    pub is_active: bool,
}

/// The payload for registering an employee.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewKaryawan {
    /// The unique employee number.
    pub nik: String,
    /// The employee's name.
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub jabatan: String,
}

/// The direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashFlow {
    /// Money handed to the employee.
    #[serde(rename = "masuk")]
    Masuk,
    /// Money spent or returned by the employee.
    #[serde(rename = "keluar")]
    Keluar,
}

impl CashFlow {
    fn as_str(self) -> &'static str {
        match self {
            CashFlow::Masuk => "masuk",
            CashFlow::Keluar => "keluar",
        }
    }
}

impl ToSql for CashFlow {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CashFlow {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "masuk" => Ok(CashFlow::Masuk),
            "keluar" => Ok(CashFlow::Keluar),
            other => Err(FromSqlError::Other(
                format!("unknown cash flow direction: {other}").into(),
            )),
        }
    }
}

/// One movement in an employee's petty cash ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cash {
    /// The id for the cash entry.
    pub id: DatabaseId,
    /// The employee the movement belongs to.
    pub karyawan_id: KaryawanId,
    /// When the money moved.
    pub tanggal: Date,
    /// The direction of the movement.
    pub tipe: CashFlow,
    /// The amount moved, always positive; the direction carries the sign.
    pub jumlah: i64,
    /// Free-text note.
    pub keterangan: String,
}

/// The payload for recording a cash movement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCash {
    /// The employee the movement belongs to.
    pub karyawan_id: KaryawanId,
    /// When the money moved.
    pub tanggal: Date,
    /// The direction of the movement.
    pub tipe: CashFlow,
    /// The amount moved.
    pub jumlah: i64,
    /// Free-text note.
    #[serde(default)]
    pub keterangan: String,
}

pub fn create_karyawan_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS karyawan (
            id INTEGER PRIMARY KEY,
            nik TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            jabatan TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

pub fn create_cash_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cash (
            id INTEGER PRIMARY KEY,
            karyawan_id INTEGER NOT NULL,
            tanggal TEXT NOT NULL,
            tipe TEXT NOT NULL,
            jumlah INTEGER NOT NULL,
            keterangan TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(karyawan_id) REFERENCES karyawan(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_karyawan(row: &Row) -> Result<Karyawan, rusqlite::Error> {
    Ok(Karyawan {
        id: row.get(0)?,
        nik: row.get(1)?,
        name: row.get(2)?,
        jabatan: row.get(3)?,
        is_active: row.get(4)?,
    })
}

fn map_row_to_cash(row: &Row) -> Result<Cash, rusqlite::Error> {
    Ok(Cash {
        id: row.get(0)?,
        karyawan_id: row.get(1)?,
        tanggal: row.get(2)?,
        tipe: row.get(3)?,
        jumlah: row.get(4)?,
        keterangan: row.get(5)?,
    })
}

/// Register a new employee.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if the NIK is empty,
/// - [Error::DuplicateNik] if an employee with the NIK already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_karyawan(
    new_karyawan: NewKaryawan,
    connection: &Connection,
) -> Result<Karyawan, Error> {
    if new_karyawan.nik.trim().is_empty() {
        return Err(Error::MissingField("nik"));
    }

    let karyawan = connection
        .prepare(
            "INSERT INTO karyawan (nik, name, jabatan) VALUES (?1, ?2, ?3)
             RETURNING id, nik, name, jabatan, is_active",
        )?
        .query_row(
            (
                new_karyawan.nik.trim(),
                new_karyawan.name,
                new_karyawan.jabatan,
            ),
            map_row_to_karyawan,
        )?;

    Ok(karyawan)
}

/// List all employees ordered by NIK.
pub fn list_karyawan(connection: &Connection) -> Result<Vec<Karyawan>, Error> {
    connection
        .prepare("SELECT id, nik, name, jabatan, is_active FROM karyawan ORDER BY nik")?
        .query_map([], map_row_to_karyawan)?
        .map(|maybe_karyawan| maybe_karyawan.map_err(Error::from))
        .collect()
}

/// Record a cash movement for an employee.
///
/// # Errors
/// This function will return a:
/// - [Error::AmountNotPositive] if `jumlah` is zero or negative,
/// - [Error::NotFound] if the employee does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_cash_entry(new_cash: NewCash, connection: &Connection) -> Result<Cash, Error> {
    if new_cash.jumlah <= 0 {
        return Err(Error::AmountNotPositive);
    }

    let entry = connection
        .prepare(
            "INSERT INTO cash (karyawan_id, tanggal, tipe, jumlah, keterangan)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, karyawan_id, tanggal, tipe, jumlah, keterangan",
        )?
        .query_row(
            (
                new_cash.karyawan_id,
                new_cash.tanggal,
                new_cash.tipe,
                new_cash.jumlah,
                new_cash.keterangan,
            ),
            map_row_to_cash,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(entry)
}

/// List an employee's cash movements, oldest first.
pub fn list_cash_entries(
    karyawan_id: KaryawanId,
    connection: &Connection,
) -> Result<Vec<Cash>, Error> {
    connection
        .prepare(
            "SELECT id, karyawan_id, tanggal, tipe, jumlah, keterangan FROM cash
             WHERE karyawan_id = :karyawan_id
             ORDER BY tanggal, id",
        )?
        .query_map(&[(":karyawan_id", &karyawan_id)], map_row_to_cash)?
        .map(|maybe_cash| maybe_cash.map_err(Error::from))
        .collect()
}

/// An employee's current balance, recomputed from the full movement history
/// on every read. Never stored.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn karyawan_balance(karyawan_id: KaryawanId, connection: &Connection) -> Result<i64, Error> {
    let balance = connection
        .prepare(
            "SELECT COALESCE(SUM(CASE WHEN tipe = 'masuk' THEN jumlah ELSE -jumlah END), 0)
             FROM cash WHERE karyawan_id = :karyawan_id",
        )?
        .query_row(&[(":karyawan_id", &karyawan_id)], |row| row.get(0))?;

    Ok(balance)
}
