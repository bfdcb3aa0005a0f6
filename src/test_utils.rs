//! Shared test utilities for the marketplace service.
//!
//! This module provides helpers for setting up test databases and creating test
//! entities with sensible defaults, plus an in-memory analytics store and scripted
//! advisory generators for exercising the revenue pipeline without a database.

use crate::{
    core::{
        analytics::{
            AdvisoryGenerator, Insight, MarketplaceSummary, Recommendation,
            advisory::fallback_recommendations,
            store::{CategoryGroup, CompletedSale, MarketplaceStore, NewSnapshot, SnapshotStore},
        },
        listing::{self, NewListing},
        user,
    },
    entities::{
        Category, Condition, Listing, ListingStatus, TransactionStatus, listing as listing_entity,
        transaction, user as user_entity,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr, Set, prelude::*, sea_query::Expr};
use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness so it only shows for failing tests.
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a user with the given email.
///
/// # Defaults
/// * `name`: "Test User"
/// * no payout account, not verified
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<user_entity::Model> {
    user::register_user(db, email, "Test User").await
}

/// Creates an active listing through the normal creation path.
///
/// # Defaults
/// * `title`: "Test listing item"
/// * `condition`: GOOD
/// * `views`: 0
pub async fn create_test_listing(
    db: &DatabaseConnection,
    seller_id: i64,
    category: Category,
    price: f64,
) -> Result<listing_entity::Model> {
    listing::create_listing(
        db,
        seller_id,
        NewListing {
            title: "Test listing item".to_string(),
            description: "A test item listed with enough description text.".to_string(),
            price,
            category,
            condition: Condition::Good,
            pickup_location: "Test pickup point".to_string(),
            pickup_instructions: None,
        },
    )
    .await
}

async fn insert_sale(
    db: &DatabaseConnection,
    listing: &listing_entity::Model,
    buyer_id: i64,
    status: TransactionStatus,
    completed_at: Option<DateTime<Utc>>,
) -> Result<transaction::Model> {
    transaction::ActiveModel {
        listing_id: Set(listing.id),
        buyer_id: Set(buyer_id),
        seller_id: Set(listing.user_id),
        amount: Set(listing.price),
        commission: Set(0.0),
        seller_payout: Set(listing.price),
        status: Set(status),
        created_at: Set(completed_at.unwrap_or_else(Utc::now)),
        completed_at: Set(completed_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Inserts a `COMPLETED` transaction for the full listing price.
pub async fn create_completed_sale(
    db: &DatabaseConnection,
    listing: &listing_entity::Model,
    buyer_id: i64,
    completed_at: DateTime<Utc>,
) -> Result<transaction::Model> {
    insert_sale(
        db,
        listing,
        buyer_id,
        TransactionStatus::Completed,
        Some(completed_at),
    )
    .await
}

/// Inserts a `PENDING` transaction for the full listing price.
pub async fn create_pending_sale(
    db: &DatabaseConnection,
    listing: &listing_entity::Model,
    buyer_id: i64,
) -> Result<transaction::Model> {
    insert_sale(db, listing, buyer_id, TransactionStatus::Pending, None).await
}

pub async fn set_listing_views(db: &DatabaseConnection, listing_id: i64, views: i32) -> Result<()> {
    Listing::update_many()
        .col_expr(listing_entity::Column::Views, Expr::value(views))
        .filter(listing_entity::Column::Id.eq(listing_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn set_listing_status(
    db: &DatabaseConnection,
    listing_id: i64,
    status: ListingStatus,
) -> Result<()> {
    Listing::update_many()
        .col_expr(listing_entity::Column::Status, Expr::value(status))
        .filter(listing_entity::Column::Id.eq(listing_id))
        .exec(db)
        .await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct MemListing {
    id: i64,
    user_id: i64,
    category: Category,
    price: f64,
    views: i64,
    status: ListingStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct MemSale {
    listing_id: i64,
    amount: f64,
    status: TransactionStatus,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct MemState {
    listings: Vec<MemListing>,
    sales: Vec<MemSale>,
    insights: Vec<(Insight, bool)>,
    snapshots: Vec<NewSnapshot>,
}

/// In-memory stand-in for both analytics store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemState>,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Database(DbErr::Custom("store unavailable".to_string())));
        }
        Ok(())
    }

    /// Makes every read fail from now on.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Adds a listing and returns its ID.
    pub fn add_listing(
        &self,
        user_id: i64,
        category: Category,
        price: f64,
        views: i64,
        status: ListingStatus,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let mut state = self.state();
        let id = i64::try_from(state.listings.len()).unwrap_or(i64::MAX) + 1;
        state.listings.push(MemListing {
            id,
            user_id,
            category,
            price,
            views,
            status,
            created_at,
        });
        id
    }

    pub fn add_sale(
        &self,
        listing_id: i64,
        amount: f64,
        status: TransactionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) {
        self.state().sales.push(MemSale {
            listing_id,
            amount,
            status,
            completed_at,
        });
    }

    pub fn active_insight_count(&self) -> usize {
        self.state().insights.iter().filter(|(_, active)| *active).count()
    }

    pub fn total_insight_count(&self) -> usize {
        self.state().insights.len()
    }

    pub fn metric_snapshots(&self) -> Vec<NewSnapshot> {
        self.state().snapshots.clone()
    }
}

fn matches_category(listing: &MemListing, category: Option<Category>) -> bool {
    category.is_none_or(|c| listing.category == c)
}

impl MarketplaceStore for MemoryStore {
    async fn completed_sales_since(
        &self,
        since: DateTime<Utc>,
        category: Option<Category>,
    ) -> Result<Vec<CompletedSale>> {
        self.check_reads()?;
        let state = self.state();
        Ok(state
            .sales
            .iter()
            .filter(|s| s.status == TransactionStatus::Completed)
            .filter(|s| s.completed_at.is_some_and(|at| at >= since))
            .filter_map(|s| {
                let listing = state.listings.iter().find(|l| l.id == s.listing_id)?;
                matches_category(listing, category).then_some(CompletedSale {
                    amount: s.amount,
                    category: listing.category,
                })
            })
            .collect())
    }

    async fn count_users_listing_since(&self, since: DateTime<Utc>) -> Result<u64> {
        self.check_reads()?;
        let mut users: Vec<i64> = self
            .state()
            .listings
            .iter()
            .filter(|l| l.created_at >= since)
            .map(|l| l.user_id)
            .collect();
        users.sort_unstable();
        users.dedup();
        Ok(users.len() as u64)
    }

    async fn count_active_listings(&self, category: Option<Category>) -> Result<u64> {
        self.check_reads()?;
        Ok(self
            .state()
            .listings
            .iter()
            .filter(|l| l.status == ListingStatus::Active && matches_category(l, category))
            .count() as u64)
    }

    #[allow(clippy::cast_precision_loss)]
    async fn active_category_groups(&self) -> Result<Vec<CategoryGroup>> {
        self.check_reads()?;
        let mut groups: Vec<(Category, i64, f64)> = Vec::new();
        for l in self.state().listings.iter().filter(|l| l.status == ListingStatus::Active) {
            match groups.iter_mut().find(|(c, _, _)| *c == l.category) {
                Some((_, count, total)) => {
                    *count += 1;
                    *total += l.price;
                }
                None => groups.push((l.category, 1, l.price)),
            }
        }
        Ok(groups
            .into_iter()
            .map(|(category, listing_count, total)| CategoryGroup {
                category,
                listing_count,
                avg_price: Some(total / listing_count as f64),
            })
            .collect())
    }

    async fn total_views(&self, category: Option<Category>) -> Result<i64> {
        self.check_reads()?;
        Ok(self
            .state()
            .listings
            .iter()
            .filter(|l| matches_category(l, category))
            .map(|l| l.views)
            .sum())
    }
}

impl SnapshotStore for MemoryStore {
    async fn deactivate_active_insights(&self) -> Result<u64> {
        let mut retired = 0;
        for (_, active) in &mut self.state().insights {
            if *active {
                *active = false;
                retired += 1;
            }
        }
        Ok(retired)
    }

    async fn insert_active_insights(
        &self,
        insights: &[Insight],
        _created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.state()
            .insights
            .extend(insights.iter().cloned().map(|i| (i, true)));
        Ok(())
    }

    async fn insert_snapshot(&self, snapshot: &NewSnapshot) -> Result<()> {
        self.state().snapshots.push(snapshot.clone());
        Ok(())
    }
}

/// Advisor that returns a fixed insight list and the canned recommendations.
#[derive(Debug, Clone)]
pub struct ScriptedAdvisor {
    insights: Vec<Insight>,
}

impl ScriptedAdvisor {
    #[must_use]
    pub const fn new(insights: Vec<Insight>) -> Self {
        Self { insights }
    }
}

impl AdvisoryGenerator for ScriptedAdvisor {
    async fn generate_insights(&self, _summary: &MarketplaceSummary) -> Result<Vec<Insight>> {
        Ok(self.insights.clone())
    }

    async fn generate_recommendations(&self, _insights: &[Insight]) -> Result<Vec<Recommendation>> {
        Ok(fallback_recommendations())
    }
}

/// Advisor whose generator always answers with malformed output.
#[derive(Debug, Clone, Copy)]
pub struct FailingAdvisor;

impl AdvisoryGenerator for FailingAdvisor {
    async fn generate_insights(&self, _summary: &MarketplaceSummary) -> Result<Vec<Insight>> {
        Err(Error::Advisory {
            message: "Malformed insight list".to_string(),
        })
    }

    async fn generate_recommendations(&self, _insights: &[Insight]) -> Result<Vec<Recommendation>> {
        Err(Error::Advisory {
            message: "Malformed recommendation list".to_string(),
        })
    }
}
