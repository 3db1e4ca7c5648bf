//! Defines the endpoints for managing regional master data.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    regional::core::{
        NewRegional, create_regional, list_regionals, set_regional_active, update_regional,
    },
};

/// Query parameters for listing regional units.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Include retired units in the listing.
    #[serde(default)]
    pub include_inactive: bool,
}

/// The form data for renaming a regional unit.
#[derive(Debug, Deserialize)]
pub struct UpdateRegionalForm {
    /// The unit's display name.
    pub name: String,
}

/// A route handler for creating a new regional unit.
pub async fn create_regional_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<NewRegional>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let regional = create_regional(payload, &connection)?;

    Ok((StatusCode::CREATED, Json(regional)).into_response())
}

/// A route handler for listing regional units.
pub async fn get_regionals_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let regionals = list_regionals(query.include_inactive, &connection)?;

    Ok(Json(regionals).into_response())
}

/// A route handler for renaming a regional unit.
pub async fn update_regional_endpoint(
    State(state): State<AppState>,
    Path(regional_id): Path<DatabaseId>,
    Json(form): Json<UpdateRegionalForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let regional = update_regional(regional_id, &form.name, &connection)?;

    Ok(Json(regional).into_response())
}

/// A route handler for retiring a regional unit.
pub async fn deactivate_regional_endpoint(
    State(state): State<AppState>,
    Path(regional_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    set_regional_active(regional_id, false, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
