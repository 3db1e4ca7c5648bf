//! Defines the endpoints for manual transaction entry and maintenance.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::core::{
        NewTransaction, TransactionFilter, TransactionUpdate, create_transaction,
        delete_transaction, get_transaction, list_transactions, update_transaction,
    },
};

/// A route handler for recording a transaction.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<NewTransaction>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let transaction = create_transaction(payload, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// A route handler for listing transactions with optional filters.
pub async fn get_transactions_endpoint(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let transactions = list_transactions(&filter, &connection)?;

    Ok(Json(transactions).into_response())
}

/// A route handler for one transaction.
pub async fn get_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let transaction = get_transaction(transaction_id, &connection)?;

    Ok(Json(transaction).into_response())
}

/// A route handler for editing a transaction.
///
/// A fund-generated transaction can be edited like any other, but the parent
/// fund is not touched: the fund is authoritative and pushes its state onto
/// its transactions, never the other way around.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let transaction = update_transaction(transaction_id, payload, &connection)?;

    Ok(Json(transaction).into_response())
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    delete_transaction(transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
