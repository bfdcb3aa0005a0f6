//! Purchase (transaction) endpoints.

use super::{AppState, caller::Caller};
use crate::{
    core::purchase::{self, Breakdown, PurchaseHistory},
    entities::transaction,
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `POST /api/transactions`.
#[derive(Debug, Deserialize)]
pub struct StartPurchaseRequest {
    /// Listing to buy
    pub listing_id: i64,
}

/// Body of the confirm endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmRequest {
    /// Agreed pickup time
    pub pickup_scheduled_at: Option<DateTime<Utc>>,
}

/// Body of the cancel endpoint.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    /// Shown to the other party
    pub reason: String,
}

/// Query of the breakdown preview.
#[derive(Debug, Deserialize)]
pub struct BreakdownQuery {
    /// Sale amount to split
    pub amount: f64,
}

/// `POST /api/transactions`
pub async fn start(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<StartPurchaseRequest>,
) -> Result<(StatusCode, Json<transaction::Model>), Error> {
    let started = purchase::start_purchase(
        &state.db,
        caller,
        request.listing_id,
        state.settings.payments.commission_percentage,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(started)))
}

/// `GET /api/transactions`
pub async fn history(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<PurchaseHistory>, Error> {
    Ok(Json(purchase::purchases_for_user(&state.db, caller).await?))
}

/// `GET /api/transactions/:id`, participants only.
pub async fn get(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(transaction_id): Path<i64>,
) -> Result<Json<transaction::Model>, Error> {
    Ok(Json(purchase::get_purchase(&state.db, caller, transaction_id).await?))
}

/// The body is optional; without one no pickup time is scheduled.
pub async fn confirm(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(transaction_id): Path<i64>,
    request: Option<Json<ConfirmRequest>>,
) -> Result<Json<transaction::Model>, Error> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let confirmed = purchase::confirm_payment(
        &state.db,
        caller,
        transaction_id,
        request.pickup_scheduled_at,
    )
    .await?;
    Ok(Json(confirmed))
}

/// `POST /api/transactions/:id/complete`
pub async fn complete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(transaction_id): Path<i64>,
) -> Result<Json<transaction::Model>, Error> {
    Ok(Json(purchase::complete_pickup(&state.db, caller, transaction_id).await?))
}

/// `POST /api/transactions/:id/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(transaction_id): Path<i64>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<transaction::Model>, Error> {
    let cancelled =
        purchase::cancel_purchase(&state.db, caller, transaction_id, &request.reason).await?;
    Ok(Json(cancelled))
}

/// Price split preview for a given amount at the configured commission.
pub async fn breakdown(
    State(state): State<AppState>,
    Query(query): Query<BreakdownQuery>,
) -> Result<Json<Breakdown>, Error> {
    if !query.amount.is_finite() || query.amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: query.amount,
        });
    }
    Ok(Json(purchase::calculate_breakdown(
        query.amount,
        state.settings.payments.commission_percentage,
    )))
}
