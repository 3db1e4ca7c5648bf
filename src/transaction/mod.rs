//! Expenditure transactions and their status machine.
//!
//! A transaction either stands alone (manual entry) or is a projection of an
//! imprest fund item. Status is always derived, never trusted from caller
//! input.

pub mod core;
mod endpoints;
pub mod status;

pub use core::{
    JenisPengadaan, NewTransaction, Transaction, TransactionFilter, TransactionUpdate,
    create_transaction, create_transaction_table, delete_transaction, delete_transactions_for_fund,
    get_transaction, list_transactions, list_transactions_for_fund, map_transaction_row,
    sync_transactions_for_fund, update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};
pub use status::{
    CompletionCheck, FinanceFields, TaskFlags, TransactionStatus, derive_status_on_create,
    derive_status_on_update, derive_task_flags,
};
