//! General-ledger account master data.
//!
//! GL accounts are budget line-item categories. Once referenced by a budget,
//! fund item, or transaction they are never physically deleted; retirement is
//! a soft `is_active` flag.

pub mod core;
mod endpoints;

pub use core::{
    GlAccount, NewGlAccount, create_gl_account, create_gl_account_table, get_gl_account,
    get_gl_account_by_code, list_gl_accounts, map_row_to_gl_account, set_gl_account_active,
    update_gl_account,
};
pub use endpoints::{
    create_gl_account_endpoint, deactivate_gl_account_endpoint, get_gl_accounts_endpoint,
    update_gl_account_endpoint,
};
