//! Defines the core data model and database queries for yearly budgets.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    budget::split::{
        months_from_quarters, quarters_from_months, split_across_months, split_across_quarters,
    },
    database_id::{BudgetId, GlAccountId},
};

/// A yearly budget for one GL account, split into quarterly and monthly
/// amounts.
///
/// There is at most one budget per (GL account, year); writes go through
/// [upsert_budget].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The id for the budget.
    pub id: BudgetId,
    /// The GL account the budget belongs to.
    pub gl_account_id: GlAccountId,
    /// The budget year.
    pub year: i32,
    /// The proposed budget value before release.
    pub rkap: i64,
    /// How much of the RKAP has been released, 0-100.
    pub release_percent: f64,
    /// `floor(rkap * release_percent / 100)`.
    pub total_amount: i64,
    /// Amount per quarter, Q1 through Q4.
    pub quarterly: [i64; 4],
    /// Amount per month, January through December.
    pub monthly: [i64; 12],
}

/// The payload for creating or replacing a budget.
///
/// Explicit amounts on one side (quarters or months) derive the other side;
/// when both are omitted the total is auto-split both ways.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpsert {
    /// The GL account the budget belongs to.
    pub gl_account_id: GlAccountId,
    /// The budget year.
    pub year: i32,
    /// The proposed budget value before release.
    pub rkap: i64,
    /// How much of the RKAP is released, 0-100.
    pub release_percent: f64,
    /// Amount per quarter. Derived from the months, or auto-split from the
    /// total, when omitted.
    #[serde(default)]
    pub quarterly: Option<[i64; 4]>,
    /// Amount per month. Derived from the quarters, or auto-split from the
    /// total, when omitted.
    #[serde(default)]
    pub monthly: Option<[i64; 12]>,
}

/// `floor(rkap * release_percent / 100)` — the spendable part of a proposed
/// budget.
pub fn total_from_rkap(rkap: i64, release_percent: f64) -> i64 {
    (rkap as f64 * release_percent / 100.0).floor() as i64
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            gl_account_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            rkap INTEGER NOT NULL,
            release_percent REAL NOT NULL,
            total_amount INTEGER NOT NULL,
            q1_amount INTEGER NOT NULL,
            q2_amount INTEGER NOT NULL,
            q3_amount INTEGER NOT NULL,
            q4_amount INTEGER NOT NULL,
            jan_amount INTEGER NOT NULL,
            feb_amount INTEGER NOT NULL,
            mar_amount INTEGER NOT NULL,
            apr_amount INTEGER NOT NULL,
            may_amount INTEGER NOT NULL,
            jun_amount INTEGER NOT NULL,
            jul_amount INTEGER NOT NULL,
            aug_amount INTEGER NOT NULL,
            sep_amount INTEGER NOT NULL,
            oct_amount INTEGER NOT NULL,
            nov_amount INTEGER NOT NULL,
            dec_amount INTEGER NOT NULL,
            UNIQUE(gl_account_id, year),
            FOREIGN KEY(gl_account_id) REFERENCES gl_account(id)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    let mut quarterly = [0; 4];
    for (index, amount) in quarterly.iter_mut().enumerate() {
        *amount = row.get(6 + index)?;
    }

    let mut monthly = [0; 12];
    for (index, amount) in monthly.iter_mut().enumerate() {
        *amount = row.get(10 + index)?;
    }

    Ok(Budget {
        id: row.get(0)?,
        gl_account_id: row.get(1)?,
        year: row.get(2)?,
        rkap: row.get(3)?,
        release_percent: row.get(4)?,
        total_amount: row.get(5)?,
        quarterly,
        monthly,
    })
}

const BUDGET_COLUMNS: &str = "id, gl_account_id, year, rkap, release_percent, total_amount,
    q1_amount, q2_amount, q3_amount, q4_amount,
    jan_amount, feb_amount, mar_amount, apr_amount, may_amount, jun_amount,
    jul_amount, aug_amount, sep_amount, oct_amount, nov_amount, dec_amount";

/// Create or replace the budget for (GL account, year).
///
/// The total is always recomputed from RKAP and the release percentage;
/// quarterly amounts default to an even auto-split of the total and monthly
/// amounts default to a per-quarter 3-way split.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidReleasePercent] if the release percentage is outside 0-100,
/// - [Error::AmountNotPositive] if the RKAP is negative,
/// - [Error::NotFound] if the GL account does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn upsert_budget(form: BudgetUpsert, connection: &Connection) -> Result<Budget, Error> {
    if !(0.0..=100.0).contains(&form.release_percent) {
        return Err(Error::InvalidReleasePercent(form.release_percent));
    }
    if form.rkap < 0 {
        return Err(Error::AmountNotPositive);
    }

    let total_amount = total_from_rkap(form.rkap, form.release_percent);
    // Quarters and months fall back independently: a fully-auto budget
    // splits the total both ways, while explicit amounts on one side derive
    // the other. Month/quarter agreement is a soft invariant, not enforced.
    let (quarterly, monthly) = match (form.quarterly, form.monthly) {
        (Some(quarterly), Some(monthly)) => (quarterly, monthly),
        (Some(quarterly), None) => (quarterly, months_from_quarters(quarterly)),
        (None, Some(monthly)) => (quarters_from_months(monthly), monthly),
        (None, None) => (
            split_across_quarters(total_amount),
            split_across_months(total_amount),
        ),
    };

    let sql = format!(
        "INSERT INTO budget (gl_account_id, year, rkap, release_percent, total_amount,
            q1_amount, q2_amount, q3_amount, q4_amount,
            jan_amount, feb_amount, mar_amount, apr_amount, may_amount, jun_amount,
            jul_amount, aug_amount, sep_amount, oct_amount, nov_amount, dec_amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
         ON CONFLICT(gl_account_id, year) DO UPDATE SET
            rkap = excluded.rkap,
            release_percent = excluded.release_percent,
            total_amount = excluded.total_amount,
            q1_amount = excluded.q1_amount,
            q2_amount = excluded.q2_amount,
            q3_amount = excluded.q3_amount,
            q4_amount = excluded.q4_amount,
            jan_amount = excluded.jan_amount,
            feb_amount = excluded.feb_amount,
            mar_amount = excluded.mar_amount,
            apr_amount = excluded.apr_amount,
            may_amount = excluded.may_amount,
            jun_amount = excluded.jun_amount,
            jul_amount = excluded.jul_amount,
            aug_amount = excluded.aug_amount,
            sep_amount = excluded.sep_amount,
            oct_amount = excluded.oct_amount,
            nov_amount = excluded.nov_amount,
            dec_amount = excluded.dec_amount
         RETURNING {BUDGET_COLUMNS}"
    );

    let budget = connection
        .prepare(&sql)?
        .query_row(
            rusqlite::params![
                form.gl_account_id,
                form.year,
                form.rkap,
                form.release_percent,
                total_amount,
                quarterly[0],
                quarterly[1],
                quarterly[2],
                quarterly[3],
                monthly[0],
                monthly[1],
                monthly[2],
                monthly[3],
                monthly[4],
                monthly[5],
                monthly[6],
                monthly[7],
                monthly[8],
                monthly[9],
                monthly[10],
                monthly[11],
            ],
            map_row_to_budget,
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

    Ok(budget)
}

/// Retrieve a budget by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    let sql = format!("SELECT {BUDGET_COLUMNS} FROM budget WHERE id = :id");

    let budget = connection
        .prepare(&sql)?
        .query_row(&[(":id", &id)], map_row_to_budget)?;

    Ok(budget)
}

/// Retrieve the budget for (GL account, year), if one exists.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn find_budget(
    gl_account_id: GlAccountId,
    year: i32,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    let sql = format!(
        "SELECT {BUDGET_COLUMNS} FROM budget
         WHERE gl_account_id = :gl_account_id AND year = :year"
    );

    let budget = connection
        .prepare(&sql)?
        .query_row(
            &[
                (":gl_account_id", &gl_account_id as &dyn rusqlite::ToSql),
                (":year", &year),
            ],
            map_row_to_budget,
        )
        .optional()?;

    Ok(budget)
}

/// List the budgets for a year, ordered by GL account.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_budgets(year: i32, connection: &Connection) -> Result<Vec<Budget>, Error> {
    let sql = format!(
        "SELECT {BUDGET_COLUMNS} FROM budget WHERE year = :year ORDER BY gl_account_id"
    );

    connection
        .prepare(&sql)?
        .query_map(&[(":year", &year)], map_row_to_budget)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Delete a budget. Its regional allocations are removed by the cascade.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
