//! Purchase business logic - Handles the lifecycle of a listing purchase.
//!
//! A purchase starts as `PENDING`, moves to `PAYMENT_COMPLETED` once the buyer confirms
//! payment and to `COMPLETED` when the item is picked up. Either participant may cancel
//! before completion. Every status change is checked against
//! [`TransactionStatus::can_transition_to`], and completion marks the listing sold in the
//! same database transaction. Completed purchases are what revenue analytics count.

use crate::{
    entities::{Listing, ListingStatus, Transaction, TransactionStatus, User, listing, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// How a sale amount splits between the marketplace and the seller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    /// Amount rounded to minor units
    pub amount: f64,
    /// Marketplace cut
    pub commission: f64,
    /// What the seller receives
    pub seller_payout: f64,
}

/// A user's purchases (as buyer) and sales (as seller), newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseHistory {
    /// Transactions where the user is the buyer
    pub purchases: Vec<transaction::Model>,
    /// Transactions where the user is the seller
    pub sales: Vec<transaction::Model>,
}

/// Splits `amount` into commission and seller payout.
///
/// The split is done in minor units (cents/paise) so the two parts always add back up
/// to the rounded amount: `commission = round(minor * pct / 100)`, `payout = minor - commission`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn calculate_breakdown(amount: f64, commission_percentage: f64) -> Breakdown {
    let minor = (amount * 100.0).round() as i64;
    let commission = (minor as f64 * commission_percentage / 100.0).round() as i64;
    let payout = minor - commission;

    Breakdown {
        amount: minor as f64 / 100.0,
        commission: commission as f64 / 100.0,
        seller_payout: payout as f64 / 100.0,
    }
}

fn ensure_transition(purchase: &transaction::Model, next: TransactionStatus) -> Result<()> {
    if purchase.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            id: purchase.id,
            from: purchase.status.as_str().to_string(),
            to: next.as_str().to_string(),
        })
    }
}

fn ensure_participant(purchase: &transaction::Model, caller_id: i64) -> Result<()> {
    if purchase.buyer_id == caller_id || purchase.seller_id == caller_id {
        Ok(())
    } else {
        Err(Error::Forbidden {
            message: format!("User {caller_id} is not part of transaction {}", purchase.id),
        })
    }
}

async fn find_purchase<C: ConnectionTrait>(
    db: &C,
    transaction_id: i64,
) -> Result<transaction::Model> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })
}

/// Starts a purchase of `listing_id` by `buyer_id`.
///
/// # Arguments
/// * `buyer_id` - User buying the item
/// * `listing_id` - Listing to buy; must be `ACTIVE` and not owned by the buyer
/// * `commission_percentage` - Marketplace cut, from the payment settings
///
/// The seller must already have a payout account on file.
#[instrument(skip(db))]
pub async fn start_purchase(
    db: &DatabaseConnection,
    buyer_id: i64,
    listing_id: i64,
    commission_percentage: f64,
) -> Result<transaction::Model> {
    let (listing, seller) = Listing::find_by_id(listing_id)
        .find_also_related(User)
        .one(db)
        .await?
        .ok_or(Error::ListingNotFound { id: listing_id })?;

    if listing.status != ListingStatus::Active {
        return Err(Error::ListingUnavailable { id: listing_id });
    }
    if listing.user_id == buyer_id {
        return Err(Error::InvalidInput {
            message: "Cannot buy your own listing".to_string(),
        });
    }
    let seller = seller.ok_or(Error::UserNotFound { id: listing.user_id })?;
    if seller.payout_account_id.is_none() {
        return Err(Error::InvalidInput {
            message: "Seller has not set up payments".to_string(),
        });
    }

    let breakdown = calculate_breakdown(listing.price, commission_percentage);
    let purchase = transaction::ActiveModel {
        listing_id: Set(listing.id),
        buyer_id: Set(buyer_id),
        seller_id: Set(listing.user_id),
        amount: Set(breakdown.amount),
        commission: Set(breakdown.commission),
        seller_payout: Set(breakdown.seller_payout),
        status: Set(TransactionStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        transaction_id = purchase.id,
        listing_id,
        buyer_id,
        "Started purchase"
    );
    Ok(purchase)
}

/// Buyer confirms payment, optionally scheduling the pickup.
#[instrument(skip(db))]
pub async fn confirm_payment(
    db: &DatabaseConnection,
    caller_id: i64,
    transaction_id: i64,
    pickup_scheduled_at: Option<DateTime<Utc>>,
) -> Result<transaction::Model> {
    let purchase = find_purchase(db, transaction_id).await?;
    if purchase.buyer_id != caller_id {
        return Err(Error::Forbidden {
            message: "Only the buyer can confirm payment".to_string(),
        });
    }
    ensure_transition(&purchase, TransactionStatus::PaymentCompleted)?;

    let mut active: transaction::ActiveModel = purchase.into();
    active.status = Set(TransactionStatus::PaymentCompleted);
    if pickup_scheduled_at.is_some() {
        active.pickup_scheduled_at = Set(pickup_scheduled_at);
    }
    active.update(db).await.map_err(Into::into)
}

/// Marks the pickup done: the purchase becomes `COMPLETED` and the listing `SOLD`.
///
/// Both updates run in one database transaction. A listing sells once: completing a
/// second purchase of an already sold listing fails with [`Error::ListingUnavailable`].
#[instrument(skip(db))]
pub async fn complete_pickup(
    db: &DatabaseConnection,
    caller_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;

    let purchase = find_purchase(&txn, transaction_id).await?;
    ensure_participant(&purchase, caller_id)?;
    ensure_transition(&purchase, TransactionStatus::Completed)?;

    let listing_id = purchase.listing_id;
    let listing = Listing::find_by_id(listing_id)
        .one(&txn)
        .await?
        .ok_or(Error::ListingNotFound { id: listing_id })?;
    if listing.status == ListingStatus::Sold {
        return Err(Error::ListingUnavailable { id: listing_id });
    }

    let now = Utc::now();
    let mut active: transaction::ActiveModel = purchase.into();
    active.status = Set(TransactionStatus::Completed);
    active.completed_at = Set(Some(now));
    let completed = active.update(&txn).await?;

    let mut sold: listing::ActiveModel = listing.into();
    sold.status = Set(ListingStatus::Sold);
    sold.sold_at = Set(Some(now));
    sold.update(&txn).await?;

    txn.commit().await?;

    info!(transaction_id, listing_id, "Purchase completed");
    Ok(completed)
}

/// Either participant cancels a purchase that has not completed yet.
#[instrument(skip(db))]
pub async fn cancel_purchase(
    db: &DatabaseConnection,
    caller_id: i64,
    transaction_id: i64,
    reason: &str,
) -> Result<transaction::Model> {
    let purchase = find_purchase(db, transaction_id).await?;
    ensure_participant(&purchase, caller_id)?;
    ensure_transition(&purchase, TransactionStatus::Cancelled)?;

    let mut active: transaction::ActiveModel = purchase.into();
    active.status = Set(TransactionStatus::Cancelled);
    active.cancelled_at = Set(Some(Utc::now()));
    active.cancellation_reason = Set(Some(reason.trim().to_string()));
    active.update(db).await.map_err(Into::into)
}

/// Fetches a purchase visible to the caller.
pub async fn get_purchase(
    db: &DatabaseConnection,
    caller_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model> {
    let purchase = find_purchase(db, transaction_id).await?;
    ensure_participant(&purchase, caller_id)?;
    Ok(purchase)
}

/// Both sides of a user's purchase history, newest first.
pub async fn purchases_for_user(db: &DatabaseConnection, user_id: i64) -> Result<PurchaseHistory> {
    let (purchases, sales) = tokio::try_join!(
        Transaction::find()
            .filter(transaction::Column::BuyerId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id)
            .all(db),
        Transaction::find()
            .filter(transaction::Column::SellerId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id)
            .all(db),
    )?;

    Ok(PurchaseHistory { purchases, sales })
}
