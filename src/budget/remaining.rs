//! The remaining-balance query: how much of a regional's quarterly
//! allocation is left after actual spend.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    budget::{allocation::find_allocation, core::find_budget},
    database_id::GlAccountId,
    period::quarter_date_range,
};

/// The answer to "how much budget remains" for one (GL account, regional,
/// quarter, year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingBalance {
    /// The regional's allocated amount for the quarter.
    pub allocated: i64,
    /// The summed receipt values of matching transactions in the quarter's
    /// date window.
    pub used: i64,
    /// `allocated - used`. May be negative; overspend is surfaced as a
    /// warning, not an error.
    pub remaining: i64,
}

impl RemainingBalance {
    /// The all-zero balance reported when no budget exists.
    pub const ZERO: RemainingBalance = RemainingBalance {
        allocated: 0,
        used: 0,
        remaining: 0,
    };
}

/// Compute the remaining allocation for (GL account, regional, quarter, year).
///
/// `used` sums `nilai_kwitansi` over transactions matching the GL account,
/// regional code, and year whose receipt date (`tanggal_kwitansi`) falls in
/// the quarter's calendar window. Transactions without a receipt date are not
/// counted.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidQuarter] if `quarter` is outside 1..=4,
/// - or [Error::SqlError] if there is an SQL error.
pub fn remaining(
    gl_account_id: GlAccountId,
    regional_code: &str,
    quarter: u8,
    year: i32,
    connection: &Connection,
) -> Result<RemainingBalance, Error> {
    let (window_start, window_end) = quarter_date_range(year, quarter)?;

    let Some(budget) = find_budget(gl_account_id, year, connection)? else {
        return Ok(RemainingBalance::ZERO);
    };

    let allocated = find_allocation(budget.id, regional_code, quarter, connection)?
        .map(|allocation| allocation.amount)
        .unwrap_or(0);

    let used: i64 = connection
        .prepare(
            "SELECT COALESCE(SUM(nilai_kwitansi), 0) FROM \"transaction\"
             WHERE gl_account_id = :gl_account_id
               AND regional_code = :regional_code
               AND year = :year
               AND tanggal_kwitansi >= :window_start
               AND tanggal_kwitansi <= :window_end",
        )?
        .query_row(
            &[
                (":gl_account_id", &gl_account_id as &dyn rusqlite::ToSql),
                (":regional_code", &regional_code),
                (":year", &year),
                (":window_start", &window_start),
                (":window_end", &window_end),
            ],
            |row| row.get(0),
        )?;

    Ok(RemainingBalance {
        allocated,
        used,
        remaining: allocated - used,
    })
}
