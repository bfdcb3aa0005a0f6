//! Listing endpoints.

use super::{AppState, caller::Caller};
use crate::{
    core::listing::{self, ListingPage, ListingQuery, ListingUpdate, NewListing},
    entities::listing as listing_entity,
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// Browse active listings. Public.
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingPage>, Error> {
    Ok(Json(listing::list_listings(&state.db, &query).await?))
}

/// `POST /api/listings`
pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(new_listing): Json<NewListing>,
) -> Result<(StatusCode, Json<listing_entity::Model>), Error> {
    let created = listing::create_listing(&state.db, caller, new_listing).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Public detail view; counts as a view.
pub async fn view(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Json<listing_entity::Model>, Error> {
    Ok(Json(listing::view_listing(&state.db, listing_id).await?))
}

/// `PATCH /api/listings/:id`, owner only.
pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(listing_id): Path<i64>,
    Json(update): Json<ListingUpdate>,
) -> Result<Json<listing_entity::Model>, Error> {
    let updated = listing::update_listing(&state.db, caller, listing_id, update).await?;
    Ok(Json(updated))
}

/// `DELETE /api/listings/:id`, owner only.
pub async fn delete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(listing_id): Path<i64>,
) -> Result<StatusCode, Error> {
    listing::delete_listing(&state.db, caller, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
