//! Defines the endpoints for the per-employee petty cash ledger.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    AppState, Error,
    cash::core::{
        Cash, NewCash, NewKaryawan, create_cash_entry, create_karyawan, karyawan_balance,
        list_cash_entries, list_karyawan,
    },
    database_id::KaryawanId,
};

/// An employee's cash history plus the balance recomputed from it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KaryawanCash {
    /// The movements, oldest first.
    pub entries: Vec<Cash>,
    /// The signed sum of all movements.
    pub balance: i64,
}

/// A route handler for registering a new employee.
pub async fn create_karyawan_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<NewKaryawan>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let karyawan = create_karyawan(payload, &connection)?;

    Ok((StatusCode::CREATED, Json(karyawan)).into_response())
}

/// A route handler for listing all employees.
pub async fn get_karyawan_endpoint(State(state): State<AppState>) -> Result<Response, Error> {
    let connection = state.connection()?;
    let karyawan = list_karyawan(&connection)?;

    Ok(Json(karyawan).into_response())
}

/// A route handler for recording a cash movement.
pub async fn create_cash_entry_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<NewCash>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let entry = create_cash_entry(payload, &connection)?;

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

/// A route handler for an employee's cash history and current balance.
pub async fn get_karyawan_cash_endpoint(
    State(state): State<AppState>,
    Path(karyawan_id): Path<KaryawanId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let entries = list_cash_entries(karyawan_id, &connection)?;
    let balance = karyawan_balance(karyawan_id, &connection)?;

    Ok(Json(KaryawanCash { entries, balance }).into_response())
}
