//! The API endpoint URIs.

/// The route to access GL accounts.
pub const GL_ACCOUNTS: &str = "/api/gl_accounts";
/// The route to update or deactivate a GL account.
pub const GL_ACCOUNT: &str = "/api/gl_accounts/{gl_account_id}";
/// The route to access regional units.
pub const REGIONALS: &str = "/api/regionals";
/// The route to update or deactivate a regional unit.
pub const REGIONAL: &str = "/api/regionals/{regional_id}";
/// The route to access vendors.
pub const VENDORS: &str = "/api/vendors";
/// The route to update or deactivate a vendor.
pub const VENDOR: &str = "/api/vendors/{vendor_id}";
/// The route to access budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to access one budget with its allocations.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to save a quarter's regional allocations.
pub const BUDGET_ALLOCATIONS: &str = "/api/budgets/{budget_id}/allocations/{quarter}";
/// The route to import budgets from an uploaded file.
pub const BUDGET_IMPORT: &str = "/api/budgets/import";
/// The route to download the budget entry template.
pub const BUDGET_TEMPLATE: &str = "/api/budgets/template";
/// The route for the remaining-balance query.
pub const REMAINING: &str = "/api/remaining";
/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to upload or list a transaction's attachments.
pub const TRANSACTION_ATTACHMENTS: &str = "/api/transactions/{transaction_id}/attachments";
/// The route to download or delete one attachment.
pub const TRANSACTION_ATTACHMENT: &str =
    "/api/transactions/{transaction_id}/attachments/{file_name}";
/// The route to access imprest fund cards.
pub const CARDS: &str = "/api/cards";
/// The route to update or deactivate a card.
pub const CARD: &str = "/api/cards/{card_id}";
/// The route to top up a card.
pub const CARD_TOP_UP: &str = "/api/cards/{card_id}/top_up";
/// The route to access imprest funds.
pub const IMPREST_FUNDS: &str = "/api/imprest_funds";
/// The route to access a single imprest fund.
pub const IMPREST_FUND: &str = "/api/imprest_funds/{fund_id}";
/// The route to access employees.
pub const KARYAWAN: &str = "/api/karyawan";
/// The route for an employee's cash history and balance.
pub const KARYAWAN_CASH: &str = "/api/karyawan/{karyawan_id}/cash";
/// The route to record a cash movement.
pub const CASH: &str = "/api/cash";
