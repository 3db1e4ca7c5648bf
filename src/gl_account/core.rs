use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::GlAccountId};

/// A budget line-item category, identified by its unique GL code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlAccount {
    /// The id for the GL account.
    pub id: GlAccountId,
    /// The unique GL code, e.g. "6101001".
    pub code: String,
    /// What the account is for.
    pub description: String,
    /// Free-text note.
    pub keterangan: String,
    /// Whether the account can still be used on new records.
    pub is_active: bool,
}

/// The payload for creating a GL account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGlAccount {
    /// The unique GL code.
    pub code: String,
    /// What the account is for.
    pub description: String,
    /// Free-text note.
    #[serde(default)]
    pub keterangan: String,
}

pub fn create_gl_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS gl_account (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            keterangan TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_gl_account(row: &Row) -> Result<GlAccount, rusqlite::Error> {
    Ok(GlAccount {
        id: row.get(0)?,
        code: row.get(1)?,
        description: row.get(2)?,
        keterangan: row.get(3)?,
        is_active: row.get(4)?,
    })
}

/// Create a new GL account.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if the code is empty,
/// - [Error::DuplicateGlCode] if an account with the code already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_gl_account(
    new_account: NewGlAccount,
    connection: &Connection,
) -> Result<GlAccount, Error> {
    if new_account.code.trim().is_empty() {
        return Err(Error::MissingField("code"));
    }

    let account = connection
        .prepare(
            "INSERT INTO gl_account (code, description, keterangan)
             VALUES (?1, ?2, ?3)
             RETURNING id, code, description, keterangan, is_active",
        )?
        .query_row(
            (
                new_account.code.trim(),
                new_account.description,
                new_account.keterangan,
            ),
            map_row_to_gl_account,
        )?;

    Ok(account)
}

/// Retrieve a GL account by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid GL account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_gl_account(id: GlAccountId, connection: &Connection) -> Result<GlAccount, Error> {
    let account = connection
        .prepare(
            "SELECT id, code, description, keterangan, is_active FROM gl_account WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_gl_account)?;

    Ok(account)
}

/// Retrieve a GL account by its unique `code`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no account has the code,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_gl_account_by_code(code: &str, connection: &Connection) -> Result<GlAccount, Error> {
    let account = connection
        .prepare(
            "SELECT id, code, description, keterangan, is_active
             FROM gl_account WHERE code = :code",
        )?
        .query_row(&[(":code", &code)], map_row_to_gl_account)?;

    Ok(account)
}

/// List GL accounts ordered by code. Inactive accounts are skipped unless
/// `include_inactive` is set.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_gl_accounts(
    include_inactive: bool,
    connection: &Connection,
) -> Result<Vec<GlAccount>, Error> {
    connection
        .prepare(
            "SELECT id, code, description, keterangan, is_active FROM gl_account
             WHERE is_active = 1 OR :include_inactive
             ORDER BY code",
        )?
        .query_map(
            &[(":include_inactive", &include_inactive)],
            map_row_to_gl_account,
        )?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Update a GL account's description and note. The code is immutable once
/// created.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid GL account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_gl_account(
    id: GlAccountId,
    description: &str,
    keterangan: &str,
    connection: &Connection,
) -> Result<GlAccount, Error> {
    let rows_affected = connection.execute(
        "UPDATE gl_account SET description = :description, keterangan = :keterangan
         WHERE id = :id",
        &[
            (":description", &description as &dyn rusqlite::ToSql),
            (":keterangan", &keterangan),
            (":id", &id),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_gl_account(id, connection)
}

/// Flip a GL account's active flag. Referenced accounts are retired this way,
/// never deleted.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid GL account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_gl_account_active(
    id: GlAccountId,
    is_active: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE gl_account SET is_active = :is_active WHERE id = :id",
        &[(":is_active", &is_active as &dyn rusqlite::ToSql), (":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
