//! The allocation ledger: yearly budgets per GL account, their quarterly and
//! regional splits, and the remaining-balance computation against actual
//! spend.

pub mod allocation;
pub mod core;
mod endpoints;
pub mod import;
pub mod remaining;
pub mod split;

pub use allocation::{
    RegionalAllocation, create_regional_allocation_table, find_allocation, list_allocations,
    upsert_allocations,
};
pub use core::{
    Budget, BudgetUpsert, create_budget_table, delete_budget, find_budget, get_budget,
    list_budgets, total_from_rkap, upsert_budget,
};
pub use endpoints::{
    budget_template_endpoint, delete_budget_endpoint, get_budget_endpoint, get_budgets_endpoint,
    get_remaining_endpoint, import_budgets_endpoint, save_allocations_endpoint,
    upsert_budget_endpoint,
};
pub use remaining::{RemainingBalance, remaining};
pub use split::{
    RegionalShare, apply_percentages, months_from_quarters, quarters_from_months,
    split_across_months, split_across_quarters, split_evenly,
};
