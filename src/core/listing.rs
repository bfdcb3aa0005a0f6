//! Listing business logic - Handles creating, browsing and maintaining listings.
//!
//! Only the owner may change or delete a listing. Public reads go through
//! [`view_listing`], which bumps the view counter that revenue analytics use as the
//! conversion denominator.

use crate::{
    core::analytics::parse_category_filter,
    entities::{Category, Condition, Listing, ListingStatus, Transaction, listing, transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Page size used when a query does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Largest page a single query may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Fields supplied by a seller when creating a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListing {
    /// 5-100 characters
    pub title: String,
    /// 20-2000 characters
    pub description: String,
    /// Positive asking price
    pub price: f64,
    /// Listing category
    pub category: Category,
    /// Physical condition
    pub condition: Condition,
    /// Where the buyer collects the item, at least 5 characters
    pub pickup_location: String,
    /// Free-form notes for the buyer
    #[serde(default)]
    pub pickup_instructions: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New price
    pub price: Option<f64>,
    /// New status; `FLAGGED` is rejected
    pub status: Option<ListingStatus>,
    /// New pickup location
    pub pickup_location: Option<String>,
    /// New pickup notes
    pub pickup_instructions: Option<String>,
}

/// Browse ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSort {
    /// Newest first
    #[default]
    Recent,
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
}

/// Browse filters for active listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    /// Category name, case-insensitive; `"all"` means no filter
    pub category: Option<String>,
    /// Exact condition
    pub condition: Option<Condition>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Substring matched against title and description, case-insensitive
    pub search: Option<String>,
    /// Ordering, newest first by default
    #[serde(default)]
    pub sort: ListingSort,
    /// Page size, clamped to 1-100
    pub limit: Option<u64>,
    /// Offset returned as `next_cursor` by the previous page
    pub cursor: Option<u64>,
}

/// One page of browse results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    /// Listings on this page
    pub listings: Vec<listing::Model>,
    /// Present when more results exist
    pub next_cursor: Option<u64>,
}

fn check_len(field: &str, value: &str, min: usize, max: Option<usize>) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    let too_long = max.is_some_and(|max| len > max);
    if len < min || too_long {
        let message = match max {
            Some(max) => format!("{field} must be between {min} and {max} characters"),
            None => format!("{field} must be at least {min} characters"),
        };
        return Err(Error::InvalidInput { message });
    }
    Ok(trimmed.to_string())
}

fn validate_title(title: &str) -> Result<String> {
    check_len("Title", title, 5, Some(100))
}

fn validate_description(description: &str) -> Result<String> {
    check_len("Description", description, 20, Some(2000))
}

fn validate_pickup_location(location: &str) -> Result<String> {
    check_len("Pickup location", location, 5, None)
}

fn validate_price(price: f64) -> Result<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(Error::InvalidAmount { amount: price })
    }
}

/// Creates an active, published listing owned by `seller_id`.
#[instrument(skip(db, new), fields(title = %new.title))]
pub async fn create_listing(
    db: &DatabaseConnection,
    seller_id: i64,
    new: NewListing,
) -> Result<listing::Model> {
    let title = validate_title(&new.title)?;
    let description = validate_description(&new.description)?;
    let price = validate_price(new.price)?;
    let pickup_location = validate_pickup_location(&new.pickup_location)?;

    crate::core::user::get_profile(db, seller_id).await?;

    let now = Utc::now();
    let listing = listing::ActiveModel {
        user_id: Set(seller_id),
        title: Set(title),
        description: Set(description),
        price: Set(price),
        category: Set(new.category),
        condition: Set(new.condition),
        pickup_location: Set(pickup_location),
        pickup_instructions: Set(new.pickup_instructions),
        status: Set(ListingStatus::Active),
        views: Set(0),
        created_at: Set(now),
        published_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(listing_id = listing.id, seller_id, "Created listing");
    Ok(listing)
}

/// Fetches a listing without counting a view.
pub async fn get_listing(db: &DatabaseConnection, listing_id: i64) -> Result<listing::Model> {
    Listing::find_by_id(listing_id)
        .one(db)
        .await?
        .ok_or(Error::ListingNotFound { id: listing_id })
}

async fn owned_listing(
    db: &DatabaseConnection,
    caller_id: i64,
    listing_id: i64,
) -> Result<listing::Model> {
    let listing = get_listing(db, listing_id).await?;
    if listing.user_id != caller_id {
        return Err(Error::Forbidden {
            message: format!("Listing {listing_id} belongs to another user"),
        });
    }
    Ok(listing)
}

/// Applies an owner's partial update with the same validation as creation.
#[instrument(skip(db, update))]
pub async fn update_listing(
    db: &DatabaseConnection,
    caller_id: i64,
    listing_id: i64,
    update: ListingUpdate,
) -> Result<listing::Model> {
    let existing = owned_listing(db, caller_id, listing_id).await?;
    let mut active: listing::ActiveModel = existing.into();

    if let Some(title) = update.title {
        active.title = Set(validate_title(&title)?);
    }
    if let Some(description) = update.description {
        active.description = Set(validate_description(&description)?);
    }
    if let Some(price) = update.price {
        active.price = Set(validate_price(price)?);
    }
    if let Some(location) = update.pickup_location {
        active.pickup_location = Set(validate_pickup_location(&location)?);
    }
    if let Some(instructions) = update.pickup_instructions {
        active.pickup_instructions = Set(Some(instructions));
    }
    if let Some(status) = update.status {
        // Flagging is a moderation outcome, never an owner choice
        if status == ListingStatus::Flagged {
            return Err(Error::InvalidInput {
                message: "Listings cannot be flagged by their owner".to_string(),
            });
        }
        active.status = Set(status);
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes a listing owned by the caller.
///
/// Listings that appear in any purchase are kept for the sales history; deleting one
/// fails with [`Error::Conflict`] and the owner should set it to `REMOVED` instead.
#[instrument(skip(db))]
pub async fn delete_listing(
    db: &DatabaseConnection,
    caller_id: i64,
    listing_id: i64,
) -> Result<()> {
    owned_listing(db, caller_id, listing_id).await?;

    let purchases = Transaction::find()
        .filter(transaction::Column::ListingId.eq(listing_id))
        .count(db)
        .await?;
    if purchases > 0 {
        return Err(Error::Conflict {
            message: format!(
                "Listing {listing_id} has {purchases} purchase(s); set its status to REMOVED instead"
            ),
        });
    }

    Listing::delete_by_id(listing_id).exec(db).await?;
    info!(listing_id, "Deleted listing");
    Ok(())
}

/// Public fetch that atomically increments the view counter.
///
/// Uses `UPDATE listings SET views = views + 1 WHERE id = ?` so concurrent views
/// are never lost.
pub async fn view_listing(db: &DatabaseConnection, listing_id: i64) -> Result<listing::Model> {
    let result = Listing::update_many()
        .col_expr(
            listing::Column::Views,
            Expr::col(listing::Column::Views).add(1),
        )
        .filter(listing::Column::Id.eq(listing_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ListingNotFound { id: listing_id });
    }
    get_listing(db, listing_id).await
}

/// Browses active listings with filters, sorting and offset pagination.
pub async fn list_listings(db: &DatabaseConnection, query: &ListingQuery) -> Result<ListingPage> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(Error::InvalidInput {
            message: format!("limit must be between 1 and {MAX_PAGE_SIZE}"),
        });
    }
    let offset = query.cursor.unwrap_or(0);

    let mut select = Listing::find().filter(listing::Column::Status.eq(ListingStatus::Active));

    if let Some(category) = parse_category_filter(query.category.as_deref())? {
        select = select.filter(listing::Column::Category.eq(category));
    }
    if let Some(condition) = query.condition {
        select = select.filter(listing::Column::Condition.eq(condition));
    }
    if let Some(min) = query.min_price {
        select = select.filter(listing::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        select = select.filter(listing::Column::Price.lte(max));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        // SQLite LIKE is case-insensitive for ASCII
        select = select.filter(
            sea_orm::Condition::any()
                .add(listing::Column::Title.contains(search))
                .add(listing::Column::Description.contains(search)),
        );
    }

    select = match query.sort {
        ListingSort::Recent => select
            .order_by_desc(listing::Column::CreatedAt)
            .order_by_desc(listing::Column::Id),
        ListingSort::PriceAsc => select
            .order_by_asc(listing::Column::Price)
            .order_by_asc(listing::Column::Id),
        ListingSort::PriceDesc => select
            .order_by_desc(listing::Column::Price)
            .order_by_asc(listing::Column::Id),
    };

    let mut listings = select.offset(offset).limit(limit + 1).all(db).await?;

    let next_cursor = if listings.len() as u64 > limit {
        listings.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Some(offset + limit)
    } else {
        None
    };

    debug!(returned = listings.len(), ?next_cursor, "Listed listings");
    Ok(ListingPage {
        listings,
        next_cursor,
    })
}

/// Every listing of one user, newest first.
pub async fn listings_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<listing::Model>> {
    Listing::find()
        .filter(listing::Column::UserId.eq(user_id))
        .order_by_desc(listing::Column::CreatedAt)
        .order_by_desc(listing::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
