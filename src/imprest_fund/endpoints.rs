//! Defines the endpoints for imprest funds, their cards, and top-ups.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::{CardId, ImprestFundId},
    imprest_fund::{
        card::{NewCard, create_card, list_cards, set_card_active, update_card},
        core::{ImprestFund, ImprestItem, get_fund, list_funds, list_items},
        lifecycle::{FundPayload, create_fund, delete_fund, top_up, update_fund},
    },
    period::current_period,
    transaction::core::{Transaction, list_transactions_for_fund},
};

/// Query parameters for listing cards.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCardsQuery {
    /// Include retired cards in the listing.
    #[serde(default)]
    pub include_inactive: bool,
}

/// The form data for updating a card's holder and PIC.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardForm {
    /// The card holder.
    pub user: String,
    /// The person in charge of the card.
    #[serde(default)]
    pub pic: String,
}

/// The form data for a top-up.
#[derive(Debug, Deserialize)]
pub struct TopUpForm {
    /// The amount to credit onto the card.
    pub amount: i64,
}

/// A fund with its items and generated transactions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundView {
    /// The fund record.
    #[serde(flatten)]
    pub fund: ImprestFund,
    /// The spend lines.
    pub items: Vec<ImprestItem>,
    /// The transactions generated when the fund opened.
    pub transactions: Vec<Transaction>,
}

/// A route handler for registering a new card.
pub async fn create_card_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<NewCard>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let card = create_card(payload, &connection)?;

    Ok((StatusCode::CREATED, Json(card)).into_response())
}

/// A route handler for listing cards.
pub async fn get_cards_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ListCardsQuery>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let cards = list_cards(query.include_inactive, &connection)?;

    Ok(Json(cards).into_response())
}

/// A route handler for updating a card's holder and PIC.
///
/// The saldo is deliberately not editable; it only moves through top-ups and
/// fund lifecycle transitions.
pub async fn update_card_endpoint(
    State(state): State<AppState>,
    Path(card_id): Path<CardId>,
    Json(form): Json<UpdateCardForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let card = update_card(card_id, &form.user, &form.pic, &connection)?;

    Ok(Json(card).into_response())
}

/// A route handler for retiring a card.
pub async fn deactivate_card_endpoint(
    State(state): State<AppState>,
    Path(card_id): Path<CardId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    set_card_active(card_id, false, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// A route handler for topping up a card.
pub async fn top_up_endpoint(
    State(state): State<AppState>,
    Path(card_id): Path<CardId>,
    Json(form): Json<TopUpForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let fund = top_up(card_id, form.amount, &connection)?;

    Ok((StatusCode::CREATED, Json(fund)).into_response())
}

/// A route handler for creating a fund, as a draft or opened straight away.
pub async fn create_fund_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<FundPayload>,
) -> Result<Response, Error> {
    let period = current_period(&state.local_timezone)?;
    let connection = state.connection()?;
    let detail = create_fund(payload, period, &connection)?;

    Ok((StatusCode::CREATED, Json(detail)).into_response())
}

/// A route handler for listing funds, top-ups included.
pub async fn get_funds_endpoint(State(state): State<AppState>) -> Result<Response, Error> {
    let connection = state.connection()?;
    let funds = list_funds(&connection)?;

    Ok(Json(funds).into_response())
}

/// A route handler for one fund with its items and generated transactions.
pub async fn get_fund_endpoint(
    State(state): State<AppState>,
    Path(fund_id): Path<ImprestFundId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let fund = get_fund(fund_id, &connection)?;
    let items = list_items(fund_id, &connection)?;
    let transactions = list_transactions_for_fund(fund_id, &connection)?;

    Ok(Json(FundView {
        fund,
        items,
        transactions,
    })
    .into_response())
}

/// A route handler for editing a fund, including status transitions.
pub async fn update_fund_endpoint(
    State(state): State<AppState>,
    Path(fund_id): Path<ImprestFundId>,
    Json(payload): Json<FundPayload>,
) -> Result<Response, Error> {
    let period = current_period(&state.local_timezone)?;
    let connection = state.connection()?;
    let detail = update_fund(fund_id, payload, period, &connection)?;

    Ok(Json(detail).into_response())
}

/// A route handler for deleting a fund and reversing its card effect.
pub async fn delete_fund_endpoint(
    State(state): State<AppState>,
    Path(fund_id): Path<ImprestFundId>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    delete_fund(fund_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
