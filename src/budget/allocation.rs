//! Regional allocations: the per-quarter split of a budget across regional
//! units.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::{
    Error,
    budget::split::RegionalShare,
    database_id::{BudgetId, DatabaseId},
};

/// One regional unit's allocation of a budget's quarterly amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalAllocation {
    /// The id for the allocation.
    pub id: DatabaseId,
    /// The budget the allocation belongs to.
    pub budget_id: BudgetId,
    /// The regional unit's code.
    pub regional_code: String,
    /// The quarter (1-4) the allocation is for.
    pub quarter: u8,
    /// The allocated amount.
    pub amount: i64,
    /// The allocation as a percentage of the quarterly amount.
    pub percentage: f64,
}

pub fn create_regional_allocation_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS regional_allocation (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL,
            regional_code TEXT NOT NULL,
            quarter INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            percentage REAL NOT NULL,
            UNIQUE(budget_id, regional_code, quarter),
            FOREIGN KEY(budget_id) REFERENCES budget(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_allocation(row: &Row) -> Result<RegionalAllocation, rusqlite::Error> {
    Ok(RegionalAllocation {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        regional_code: row.get(2)?,
        quarter: row.get(3)?,
        amount: row.get(4)?,
        percentage: row.get(5)?,
    })
}

/// Replace a quarter's regional allocations with `shares`.
///
/// Each share is upserted on (budget, regional, quarter), so re-saving a
/// quarter's split overwrites the previous amounts in place.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidQuarter] if `quarter` is outside 1..=4,
/// - [Error::NotFound] if the budget does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn upsert_allocations(
    budget_id: BudgetId,
    quarter: u8,
    shares: &[RegionalShare],
    connection: &Connection,
) -> Result<Vec<RegionalAllocation>, Error> {
    if !(1..=4).contains(&quarter) {
        return Err(Error::InvalidQuarter(quarter));
    }

    let mut statement = connection.prepare(
        "INSERT INTO regional_allocation (budget_id, regional_code, quarter, amount, percentage)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(budget_id, regional_code, quarter) DO UPDATE SET
            amount = excluded.amount,
            percentage = excluded.percentage
         RETURNING id, budget_id, regional_code, quarter, amount, percentage",
    )?;

    let mut allocations = Vec::with_capacity(shares.len());
    for share in shares {
        let allocation = statement
            .query_row(
                rusqlite::params![
                    budget_id,
                    share.regional_code,
                    quarter,
                    share.amount,
                    share.percentage,
                ],
                map_row_to_allocation,
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
        allocations.push(allocation);
    }

    Ok(allocations)
}

/// List all allocations for a budget, ordered by quarter then regional code.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_allocations(
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<Vec<RegionalAllocation>, Error> {
    connection
        .prepare(
            "SELECT id, budget_id, regional_code, quarter, amount, percentage
             FROM regional_allocation
             WHERE budget_id = :budget_id
             ORDER BY quarter, regional_code",
        )?
        .query_map(&[(":budget_id", &budget_id)], map_row_to_allocation)?
        .map(|maybe_allocation| maybe_allocation.map_err(Error::from))
        .collect()
}

/// Look up one (budget, regional, quarter) allocation, if it exists.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn find_allocation(
    budget_id: BudgetId,
    regional_code: &str,
    quarter: u8,
    connection: &Connection,
) -> Result<Option<RegionalAllocation>, Error> {
    let allocation = connection
        .prepare(
            "SELECT id, budget_id, regional_code, quarter, amount, percentage
             FROM regional_allocation
             WHERE budget_id = :budget_id
               AND regional_code = :regional_code
               AND quarter = :quarter",
        )?
        .query_row(
            &[
                (":budget_id", &budget_id as &dyn rusqlite::ToSql),
                (":regional_code", &regional_code),
                (":quarter", &quarter),
            ],
            map_row_to_allocation,
        )
        .optional()?;

    Ok(allocation)
}
