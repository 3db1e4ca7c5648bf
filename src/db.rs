//! Database schema initialization.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    budget::{create_budget_table, create_regional_allocation_table},
    cash::{create_cash_table, create_karyawan_table},
    gl_account::create_gl_account_table,
    imprest_fund::{create_card_table, create_imprest_fund_table, create_imprest_item_table},
    regional::create_regional_table,
    transaction::create_transaction_table,
    vendor::create_vendor_table,
};

/// Create the tables for the domain models.
///
/// Deleting a budget cascades to its regional allocations and deleting a fund
/// cascades to its items, so foreign key enforcement is switched on for the
/// connection before anything else.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must run outside a transaction; it is a no-op inside one.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_gl_account_table(&transaction)?;
    create_regional_table(&transaction)?;
    create_vendor_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_regional_allocation_table(&transaction)?;
    create_card_table(&transaction)?;
    create_imprest_fund_table(&transaction)?;
    create_imprest_item_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_karyawan_table(&transaction)?;
    create_cash_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
