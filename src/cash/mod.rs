//! Per-employee petty cash ledger.
//!
//! Independent of the imprest fund: each employee (karyawan) has a stream of
//! signed cash movements, and the running balance is recomputed from the full
//! history on every read rather than stored.

pub mod core;
mod endpoints;

pub use core::{
    Cash, CashFlow, Karyawan, NewCash, NewKaryawan, create_cash_entry, create_cash_table,
    create_karyawan, create_karyawan_table, karyawan_balance, list_cash_entries, list_karyawan,
};
pub use endpoints::{
    create_cash_entry_endpoint, create_karyawan_endpoint, get_karyawan_cash_endpoint,
    get_karyawan_endpoint,
};
