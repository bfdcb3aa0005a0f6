//! Demo data seeding - applies a [`SeedConfig`] to the database.
//!
//! Seeding is idempotent per user: an email that already exists is skipped together
//! with its listings, so restarting with the same seed file never duplicates data.

use crate::{
    config::seed::{SeedConfig, SeedListing, SeedUser},
    entities::{ListingStatus, User, listing, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// What a seeding run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Users inserted
    pub users_created: usize,
    /// Users whose email already existed
    pub users_skipped: usize,
    /// Listings inserted
    pub listings_created: usize,
}

async fn insert_user(txn: &DatabaseTransaction, seed: &SeedUser) -> Result<user::Model> {
    user::ActiveModel {
        email: Set(seed.email.trim().to_lowercase()),
        name: Set(seed.name.trim().to_string()),
        bio: Set(seed.bio.clone()),
        location: Set(seed.location.clone()),
        verified: Set(seed.verified),
        payout_account_id: Set(seed.payout_account_id.clone()),
        payout_account_verified: Set(seed.payout_account_id.is_some()),
        joined_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(Into::into)
}

async fn insert_listing(
    txn: &DatabaseTransaction,
    seller_id: i64,
    seed: &SeedListing,
) -> Result<()> {
    if !seed.price.is_finite() || seed.price <= 0.0 {
        return Err(Error::InvalidAmount { amount: seed.price });
    }

    let now = Utc::now();
    listing::ActiveModel {
        user_id: Set(seller_id),
        title: Set(seed.title.clone()),
        description: Set(seed.description.clone()),
        price: Set(seed.price),
        category: Set(seed.category),
        condition: Set(seed.condition),
        pickup_location: Set(seed.pickup_location.clone()),
        status: Set(ListingStatus::Active),
        views: Set(seed.views.max(0)),
        created_at: Set(now),
        published_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(())
}

/// Inserts the users and listings from `config` that are not there yet.
///
/// Runs in one database transaction; any failure leaves the database untouched.
#[instrument(skip(db, config))]
pub async fn seed_marketplace(db: &DatabaseConnection, config: &SeedConfig) -> Result<SeedReport> {
    info!(
        users = config.users.len(),
        listings = config.listings.len(),
        "Seeding marketplace"
    );
    let txn = db.begin().await?;
    let mut report = SeedReport::default();
    let mut created: HashMap<String, i64> = HashMap::new();

    for seed in &config.users {
        let email = seed.email.trim().to_lowercase();
        let existing = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            debug!(%email, "User already exists, skipping");
            report.users_skipped += 1;
            continue;
        }

        let user = insert_user(&txn, seed).await?;
        created.insert(email, user.id);
        report.users_created += 1;
    }

    for seed in &config.listings {
        let Some(&seller_id) = created.get(&seed.seller_email.trim().to_lowercase()) else {
            warn!(
                seller = %seed.seller_email,
                title = %seed.title,
                "Seller not created in this run, skipping listing"
            );
            continue;
        };
        insert_listing(&txn, seller_id, seed).await?;
        report.listings_created += 1;
    }

    txn.commit().await?;
    info!(?report, "Finished seeding");
    Ok(report)
}
