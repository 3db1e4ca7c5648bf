//! Defines the endpoints for managing GL account master data.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::GlAccountId,
    gl_account::core::{
        NewGlAccount, create_gl_account, list_gl_accounts, set_gl_account_active,
        update_gl_account,
    },
};

/// Query parameters for listing GL accounts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Include retired accounts in the listing.
    #[serde(default)]
    pub include_inactive: bool,
}

/// The form data for updating a GL account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGlAccountForm {
    /// What the account is for.
    pub description: String,
    /// Free-text note.
    #[serde(default)]
    pub keterangan: String,
}

/// A route handler for creating a new GL account.
pub async fn create_gl_account_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<NewGlAccount>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let account = create_gl_account(payload, &connection)?;

    Ok((StatusCode::CREATED, Json(account)).into_response())
}

/// A route handler for listing GL accounts.
pub async fn get_gl_accounts_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let accounts = list_gl_accounts(query.include_inactive, &connection)?;

    Ok(Json(accounts).into_response())
}

/// A route handler for updating a GL account's description and note.
pub async fn update_gl_account_endpoint(
    State(state): State<AppState>,
    Path(gl_account_id): Path<GlAccountId>,
    Json(form): Json<UpdateGlAccountForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let account = update_gl_account(gl_account_id, &form.description, &form.keterangan, &connection)?;

    Ok(Json(account).into_response())
}

/// A route handler for retiring a GL account.
///
/// The row is kept so existing budgets, fund items, and transactions keep
/// their reference; only the active flag is cleared.
pub async fn deactivate_gl_account_endpoint(
    State(state): State<AppState>,
    Path(gl_account_id): Path<GlAccountId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    set_gl_account_active(gl_account_id, false, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
