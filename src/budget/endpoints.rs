//! Defines the endpoints for budgets, regional allocations, the
//! remaining-balance query, and the budget import/template pair.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    budget::{
        allocation::{RegionalAllocation, list_allocations, upsert_allocations},
        core::{Budget, BudgetUpsert, delete_budget, get_budget, list_budgets, upsert_budget},
        import::{import_budget_rows, parse_budget_csv},
        remaining::remaining,
        split::{RegionalShare, apply_percentages, split_evenly},
    },
    database_id::{BudgetId, GlAccountId},
    gl_account::list_gl_accounts,
};

/// A budget together with its saved regional allocations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetail {
    /// The budget record.
    #[serde(flatten)]
    pub budget: Budget,
    /// The regional allocations across all quarters.
    pub allocations: Vec<RegionalAllocation>,
}

/// Query parameters for listing budgets.
#[derive(Debug, Deserialize)]
pub struct ListBudgetsQuery {
    /// The budget year to list.
    pub year: i32,
}

/// How the regional entries of an allocation save are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// The quarterly amount is split into equal shares, the last regional
    /// absorbing the remainder.
    Even,
    /// Entries carry percentages (possibly partial); unfilled slots share
    /// the gap to 100 and amounts are derived.
    Percentage,
    /// Entries carry amounts verbatim; percentages are derived.
    Amount,
}

/// The form data for saving a quarter's regional allocations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationForm {
    /// How to interpret the entries.
    pub mode: SplitMode,
    /// One entry per regional unit.
    pub entries: Vec<RegionalShare>,
}

/// Query parameters for the remaining-balance query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingQuery {
    /// The GL account to check.
    pub gl_account_id: GlAccountId,
    /// The regional unit's code.
    pub regional_code: String,
    /// The quarter (1-4).
    pub quarter: u8,
    /// The budget year.
    pub year: i32,
}

/// Query parameters for the budget import.
#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// The budget year the rows are imported into.
    pub year: i32,
}

/// A route handler for creating or replacing a budget.
pub async fn upsert_budget_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<BudgetUpsert>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let budget = upsert_budget(payload, &connection)?;

    Ok(Json(budget).into_response())
}

/// A route handler for listing a year's budgets.
pub async fn get_budgets_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ListBudgetsQuery>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let budgets = list_budgets(query.year, &connection)?;

    Ok(Json(budgets).into_response())
}

/// A route handler for one budget with its regional allocations.
pub async fn get_budget_endpoint(
    State(state): State<AppState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let budget = get_budget(budget_id, &connection)?;
    let allocations = list_allocations(budget_id, &connection)?;

    Ok(Json(BudgetDetail { budget, allocations }).into_response())
}

/// A route handler for deleting a budget and its allocations.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    delete_budget(budget_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// A route handler for saving a quarter's regional allocations.
///
/// In percentage mode the entries are filled to 100% and amounts derived
/// from the budget's quarterly amount; in amount mode the amounts are taken
/// verbatim and the percentages derived. The batch is saved in one database
/// transaction.
pub async fn save_allocations_endpoint(
    State(state): State<AppState>,
    Path((budget_id, quarter)): Path<(BudgetId, u8)>,
    Json(form): Json<AllocationForm>,
) -> Result<Response, Error> {
    if form.entries.is_empty() {
        return Err(Error::MissingField("entries"));
    }
    if !(1..=4).contains(&quarter) {
        return Err(Error::InvalidQuarter(quarter));
    }

    let connection = state.connection()?;
    let budget = get_budget(budget_id, &connection)?;
    let quarter_amount = budget.quarterly[quarter as usize - 1];

    let mut entries = form.entries;
    match form.mode {
        SplitMode::Even => {
            let shares = split_evenly(quarter_amount, entries.len());
            for (entry, amount) in entries.iter_mut().zip(shares) {
                entry.amount = amount;
                entry.percentage = if quarter_amount == 0 {
                    0.0
                } else {
                    amount as f64 / quarter_amount as f64 * 100.0
                };
            }
        }
        SplitMode::Percentage => apply_percentages(quarter_amount, &mut entries),
        SplitMode::Amount => {
            for entry in &mut entries {
                entry.percentage = if quarter_amount == 0 {
                    0.0
                } else {
                    entry.amount as f64 / quarter_amount as f64 * 100.0
                };
            }
        }
    }

    let tx = connection.unchecked_transaction()?;
    let allocations = upsert_allocations(budget_id, quarter, &entries, &tx)?;
    tx.commit()?;

    Ok(Json(allocations).into_response())
}

/// A route handler for the remaining-balance query.
pub async fn get_remaining_endpoint(
    State(state): State<AppState>,
    Query(query): Query<RemainingQuery>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let balance = remaining(
        query.gl_account_id,
        &query.regional_code,
        query.quarter,
        query.year,
        &connection,
    )?;

    if balance.remaining < 0 {
        tracing::warn!(
            "allocation overspent: GL account {} regional {} Q{} {} is at {}",
            query.gl_account_id,
            query.regional_code,
            query.quarter,
            query.year,
            balance.remaining,
        );
    }

    Ok(Json(balance).into_response())
}

/// A route handler for importing budgets from an uploaded CSV file.
///
/// Rows are imported independently; the response summarises successes,
/// failures, and per-row error messages.
pub async fn import_budgets_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> Result<Response, Error> {
    let mut rows = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        let data = field
            .text()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;
        rows.extend(parse_budget_csv(&data)?);
    }

    if rows.is_empty() {
        return Err(Error::MissingField("file"));
    }

    let connection = state.connection()?;
    let tx = connection.unchecked_transaction()?;
    let summary = import_budget_rows(&rows, query.year, &tx)?;
    tx.commit()?;

    tracing::info!(
        "budget import for {}: {} imported, {} skipped",
        query.year,
        summary.success,
        summary.failed,
    );

    Ok(Json(summary).into_response())
}

/// A route handler serving the budget entry template as a CSV download.
pub async fn budget_template_endpoint(State(state): State<AppState>) -> Result<Response, Error> {
    let connection = state.connection()?;
    let gl_accounts = list_gl_accounts(false, &connection)?;
    let template = super::import::budget_template_csv(&gl_accounts);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"template_anggaran.csv\"",
            ),
        ],
        template,
    )
        .into_response())
}
