//! User profile endpoints.

use super::{AppState, caller::Caller};
use crate::{
    core::{
        listing,
        user::{self, ProfileUpdate, PublicProfile, UserStats},
    },
    entities::{listing as listing_entity, user as user_entity},
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Body of `POST /api/users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
}

/// Body of `PUT /api/users/me/payout-account`.
#[derive(Debug, Deserialize)]
pub struct PayoutAccountRequest {
    /// Payment processor account reference
    pub account_id: String,
}

/// `POST /api/users`
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<user_entity::Model>), Error> {
    let user = user::register_user(&state.db, &request.email, &request.name).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /api/users/me`
pub async fn me(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<user_entity::Model>, Error> {
    Ok(Json(user::get_profile(&state.db, caller).await?))
}

/// `PATCH /api/users/me`
pub async fn update_me(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<user_entity::Model>, Error> {
    Ok(Json(user::update_profile(&state.db, caller, update).await?))
}

/// `GET /api/users/me/stats`
pub async fn my_stats(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<UserStats>, Error> {
    Ok(Json(user::user_stats(&state.db, caller).await?))
}

/// Every listing the caller owns, whatever its status.
pub async fn my_listings(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<listing_entity::Model>>, Error> {
    Ok(Json(listing::listings_for_user(&state.db, caller).await?))
}

/// `PUT /api/users/me/payout-account`
pub async fn set_payout_account(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<PayoutAccountRequest>,
) -> Result<Json<user_entity::Model>, Error> {
    let user = user::set_payout_account(&state.db, caller, &request.account_id).await?;
    Ok(Json(user))
}

/// `GET /api/users/:id`
pub async fn public_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicProfile>, Error> {
    Ok(Json(user::public_profile(&state.db, user_id).await?))
}
