//! User business logic - registration, profiles and seller statistics.
//!
//! Identity is established upstream; every function here takes the caller's user ID
//! as already trusted.

use crate::{
    entities::{
        Listing, ListingStatus, Transaction, TransactionStatus, User, listing, transaction, user,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Maximum length of a profile bio.
pub const MAX_BIO_LEN: usize = 500;
/// Number of listings shown on a public profile.
pub const PUBLIC_LISTING_LIMIT: u64 = 10;

/// Optional profile fields to change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// Display name, at least 2 characters
    pub name: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Free text, up to 500 characters
    pub bio: Option<String>,
    /// City or area
    pub location: Option<String>,
}

/// What anyone can see about a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicProfile {
    /// User ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Profile bio
    pub bio: Option<String>,
    /// City or area
    pub location: Option<String>,
    /// Whether the user is verified
    pub verified: bool,
    /// Registration time
    pub joined_at: DateTime<Utc>,
    /// Most recent active listings, newest first
    pub listings: Vec<listing::Model>,
}

/// Listing and sale counters for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    /// Listings in any status
    pub total_listings: u64,
    /// Listings currently `ACTIVE`
    pub active_listings: u64,
    /// Listings marked `SOLD`
    pub sold_listings: u64,
    /// Completed transactions where the user was the seller
    pub completed_sales: u64,
    /// Completed transactions where the user was the buyer
    pub completed_purchases: u64,
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(Error::InvalidInput {
            message: "Name must be at least 2 characters".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Creates a new user.
///
/// Fails with [`Error::Conflict`] when the email is already registered.
#[instrument(skip(db))]
pub async fn register_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
) -> Result<user::Model> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(Error::InvalidInput {
            message: format!("'{email}' is not a valid email address"),
        });
    }
    let name = validate_name(name)?;

    let exists = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if exists.is_some() {
        return Err(Error::Conflict {
            message: "Email already registered".to_string(),
        });
    }

    let user = user::ActiveModel {
        email: Set(email),
        name: Set(name),
        verified: Set(false),
        payout_account_verified: Set(false),
        joined_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id = user.id, "Registered user");
    Ok(user)
}

/// Looks a user up by email.
pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetches a user's full record.
pub async fn get_profile(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Applies a partial profile update and returns the stored user.
#[instrument(skip(db, update))]
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let existing = get_profile(db, user_id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(name) = update.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(bio) = update.bio {
        if bio.chars().count() > MAX_BIO_LEN {
            return Err(Error::InvalidInput {
                message: format!("Bio cannot exceed {MAX_BIO_LEN} characters"),
            });
        }
        active.bio = Set(Some(bio));
    }
    if let Some(phone) = update.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(location) = update.location {
        active.location = Set(Some(location));
    }

    active.update(db).await.map_err(Into::into)
}

/// Public view of a user with their latest active listings.
pub async fn public_profile(db: &DatabaseConnection, user_id: i64) -> Result<PublicProfile> {
    let user = get_profile(db, user_id).await?;
    let listings = Listing::find()
        .filter(listing::Column::UserId.eq(user_id))
        .filter(listing::Column::Status.eq(ListingStatus::Active))
        .order_by_desc(listing::Column::CreatedAt)
        .order_by_desc(listing::Column::Id)
        .limit(PUBLIC_LISTING_LIMIT)
        .all(db)
        .await?;

    Ok(PublicProfile {
        id: user.id,
        name: user.name,
        bio: user.bio,
        location: user.location,
        verified: user.verified,
        joined_at: user.joined_at,
        listings,
    })
}

/// Listing and sale counters for one user, fetched concurrently.
pub async fn user_stats(db: &DatabaseConnection, user_id: i64) -> Result<UserStats> {
    get_profile(db, user_id).await?;

    let listings_by = |status: Option<ListingStatus>| {
        let mut query = Listing::find().filter(listing::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(listing::Column::Status.eq(status));
        }
        query.count(db)
    };

    let (total_listings, active_listings, sold_listings, completed_sales, completed_purchases) =
        tokio::try_join!(
            listings_by(None),
            listings_by(Some(ListingStatus::Active)),
            listings_by(Some(ListingStatus::Sold)),
            Transaction::find()
                .filter(transaction::Column::SellerId.eq(user_id))
                .filter(transaction::Column::Status.eq(TransactionStatus::Completed))
                .count(db),
            Transaction::find()
                .filter(transaction::Column::BuyerId.eq(user_id))
                .filter(transaction::Column::Status.eq(TransactionStatus::Completed))
                .count(db),
        )?;

    Ok(UserStats {
        total_listings,
        active_listings,
        sold_listings,
        completed_sales,
        completed_purchases,
    })
}

/// Records the payment-processor account a seller gets paid out to.
#[instrument(skip(db))]
pub async fn set_payout_account(
    db: &DatabaseConnection,
    user_id: i64,
    account_id: &str,
) -> Result<user::Model> {
    let account_id = account_id.trim();
    if account_id.is_empty() {
        return Err(Error::InvalidInput {
            message: "Payout account ID cannot be empty".to_string(),
        });
    }

    let existing = get_profile(db, user_id).await?;
    let mut active: user::ActiveModel = existing.into();
    active.payout_account_id = Set(Some(account_id.to_string()));
    active.update(db).await.map_err(Into::into)
}
