//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a GL account row.
pub type GlAccountId = i64;
/// The ID of a budget row.
pub type BudgetId = i64;
/// The ID of an imprest fund row.
pub type ImprestFundId = i64;
/// The ID of an imprest fund card row.
pub type CardId = i64;
/// The ID of a transaction row.
pub type TransactionId = i64;
/// The ID of an employee (karyawan) row.
pub type KaryawanId = i64;
