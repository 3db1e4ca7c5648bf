//! Anggaran is a budget-control service for tracking annual budget
//! allocations by general-ledger account and regional unit, recording
//! expenditure transactions against those allocations, and managing an
//! imprest (petty cash) fund lifecycle with finance-approval tracking.
//!
//! This library provides a JSON REST API backed by SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod attachment;
mod budget;
mod cash;
mod database_id;
mod db;
mod endpoints;
mod gl_account;
mod imprest_fund;
mod period;
mod regional;
mod routing;
mod tax;
mod transaction;
mod vendor;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing from the request payload.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An amount that must be positive was zero or negative.
    #[error("amount must be greater than zero")]
    AmountNotPositive,

    /// A quarter outside 1..=4 was given.
    #[error("{0} is not a valid quarter, expected 1 to 4")]
    InvalidQuarter(u8),

    /// A release percentage outside 0..=100 was given.
    #[error("{0} is not a valid release percentage, expected 0 to 100")]
    InvalidReleasePercent(f64),

    /// The specified GL account code already exists in the database.
    #[error("the GL account code already exists in the database")]
    DuplicateGlCode,

    /// The specified regional code already exists in the database.
    #[error("the regional code already exists in the database")]
    DuplicateRegionalCode,

    /// The specified imprest fund card number already exists in the database.
    #[error("the card number already exists in the database")]
    DuplicateCardNumber,

    /// The specified employee NIK already exists in the database.
    #[error("the NIK already exists in the database")]
    DuplicateNik,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Opening an imprest fund asked for more than the regional allocation
    /// has left for the current quarter.
    ///
    /// The whole open operation is aborted; nothing is persisted.
    #[error(
        "insufficient allocation for GL account {gl_account_id}: requested {needed}, remaining {remaining}"
    )]
    InsufficientAllocation {
        /// The GL account whose item group exceeded the allocation.
        gl_account_id: i64,
        /// The summed item amount the fund asked for.
        needed: i64,
        /// The allocation amount left for the current quarter.
        remaining: i64,
    },

    /// A fund cannot move from its current status to the requested one.
    #[error("cannot change fund status from {from} to {to}")]
    InvalidStatusTransition {
        /// The fund's current status.
        from: &'static str,
        /// The requested status.
        to: &'static str,
    },

    /// The uploaded file could not be parsed as CSV.
    #[error("could not parse the CSV file: {0}")]
    InvalidCsv(String),

    /// The multipart form could not be read.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An attachment could not be read from or written to disk.
    #[error("file storage error: {0}")]
    Io(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("gl_account.code") =>
            {
                Error::DuplicateGlCode
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("regional.code") =>
            {
                Error::DuplicateRegionalCode
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067
                    && desc.ends_with("imprest_fund_card.nomor_kartu") =>
            {
                Error::DuplicateCardNumber
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("karyawan.nik") =>
            {
                Error::DuplicateNik
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body returned for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Error::MissingField(_)
            | Error::AmountNotPositive
            | Error::InvalidQuarter(_)
            | Error::InvalidReleasePercent(_)
            | Error::InvalidStatusTransition { .. }
            | Error::InvalidCsv(_)
            | Error::MultipartError(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateGlCode
            | Error::DuplicateRegionalCode
            | Error::DuplicateCardNumber
            | Error::DuplicateNik
            | Error::InsufficientAllocation { .. } => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DatabaseLock | Error::Io(_) | Error::InvalidTimezone(_) | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Storage failures are logged server-side and replaced with a
            // generic message for the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(ErrorBody { error: message })).into_response()
    }
}
