//! Store-access seams for revenue analytics.
//!
//! The aggregator and snapshot writer only see these two traits, so the same code runs
//! against the database (through [`OrmStore`]) and against an in-memory fake in tests.
//! [`OrmStore`] borrows any `ConnectionTrait`, which lets the snapshot writer run either
//! on a plain connection or inside a `DatabaseTransaction`.

use crate::{
    core::analytics::advisory::Insight,
    entities::{
        Category, Listing, ListingStatus, RevenueInsight, RevenueMetric, Transaction,
        TransactionStatus, listing, revenue_insight, revenue_metric, transaction,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    FromQueryResult, QuerySelect, Set,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use std::future::Future;

/// One completed sale, reduced to what aggregation needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedSale {
    /// Sale amount
    pub amount: f64,
    /// Category of the listing that was sold
    pub category: Category,
}

/// Count and mean price of active listings in one category.
#[derive(Debug, Clone, Copy, PartialEq, FromQueryResult)]
pub struct CategoryGroup {
    /// Listing category
    pub category: Category,
    /// Active listings in the category
    pub listing_count: i64,
    /// `None` only when the database reports no rows for the group
    pub avg_price: Option<f64>,
}

/// Row to append to the revenue metric history.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    /// Revenue the run was based on
    pub total_revenue: f64,
    /// Revenue plus the insights' potential gain
    pub projected_revenue: f64,
    /// Heuristic score in 0-100
    pub optimization_score: u8,
    /// Sum of the insights' dollar impacts
    pub potential_gain: f64,
    /// Upper-case category filter, `None` when unfiltered
    pub category: Option<String>,
    /// When the run finished
    pub created_at: DateTime<Utc>,
}

/// Read side: the relational primitives the aggregator relies on.
pub trait MarketplaceStore: Sync {
    /// Completed transactions whose completion time is at or after `since`,
    /// optionally restricted to listings of one category.
    fn completed_sales_since(
        &self,
        since: DateTime<Utc>,
        category: Option<Category>,
    ) -> impl Future<Output = Result<Vec<CompletedSale>>> + Send;

    /// Number of distinct users who created at least one listing at or after `since`.
    fn count_users_listing_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Number of `ACTIVE` listings, optionally in one category.
    fn count_active_listings(
        &self,
        category: Option<Category>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// `ACTIVE` listings grouped by category with count and average price.
    fn active_category_groups(&self) -> impl Future<Output = Result<Vec<CategoryGroup>>> + Send;

    /// Sum of view counters over listings of any status, optionally in one category.
    fn total_views(&self, category: Option<Category>)
    -> impl Future<Output = Result<i64>> + Send;
}

/// Write side: bulk-update-where, insert-many and insert-one.
pub trait SnapshotStore: Sync {
    /// Marks every active insight inactive and returns how many were retired.
    fn deactivate_active_insights(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Inserts `insights` as the new active batch.
    fn insert_active_insights(
        &self,
        insights: &[Insight],
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Appends one metric snapshot.
    fn insert_snapshot(&self, snapshot: &NewSnapshot) -> impl Future<Output = Result<()>> + Send;
}

/// SeaORM-backed store over a connection or an open transaction.
#[derive(Debug)]
pub struct OrmStore<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> OrmStore<'a, C> {
    /// Wraps a connection or an open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

impl<C: ConnectionTrait> MarketplaceStore for OrmStore<'_, C> {
    async fn completed_sales_since(
        &self,
        since: DateTime<Utc>,
        category: Option<Category>,
    ) -> Result<Vec<CompletedSale>> {
        let mut query = Transaction::find()
            .filter(transaction::Column::Status.eq(TransactionStatus::Completed))
            .filter(transaction::Column::CompletedAt.gte(since))
            .find_also_related(Listing);
        if let Some(category) = category {
            query = query.filter(listing::Column::Category.eq(category));
        }

        let rows = query.all(self.conn).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(sale, listing)| {
                listing.map(|l| CompletedSale {
                    amount: sale.amount,
                    category: l.category,
                })
            })
            .collect())
    }

    async fn count_users_listing_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let sellers: Vec<i64> = Listing::find()
            .select_only()
            .column(listing::Column::UserId)
            .filter(listing::Column::CreatedAt.gte(since))
            .distinct()
            .into_tuple()
            .all(self.conn)
            .await?;
        Ok(sellers.len() as u64)
    }

    async fn count_active_listings(&self, category: Option<Category>) -> Result<u64> {
        let mut query = Listing::find().filter(listing::Column::Status.eq(ListingStatus::Active));
        if let Some(category) = category {
            query = query.filter(listing::Column::Category.eq(category));
        }
        query.count(self.conn).await.map_err(Into::into)
    }

    async fn active_category_groups(&self) -> Result<Vec<CategoryGroup>> {
        Listing::find()
            .select_only()
            .column(listing::Column::Category)
            .column_as(
                SimpleExpr::from(Func::count(Expr::col(listing::Column::Id))),
                "listing_count",
            )
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col(listing::Column::Price))),
                "avg_price",
            )
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .group_by(listing::Column::Category)
            .into_model::<CategoryGroup>()
            .all(self.conn)
            .await
            .map_err(Into::into)
    }

    async fn total_views(&self, category: Option<Category>) -> Result<i64> {
        let mut query = Listing::find().select_only().column_as(
            SimpleExpr::from(Func::sum(Expr::col(listing::Column::Views))),
            "total_views",
        );
        if let Some(category) = category {
            query = query.filter(listing::Column::Category.eq(category));
        }

        // SUM over zero rows is NULL
        let total: Option<Option<i64>> = query.into_tuple().one(self.conn).await?;
        Ok(total.flatten().unwrap_or(0))
    }
}

impl<C: ConnectionTrait> SnapshotStore for OrmStore<'_, C> {
    async fn deactivate_active_insights(&self) -> Result<u64> {
        let result = RevenueInsight::update_many()
            .col_expr(revenue_insight::Column::IsActive, Expr::value(false))
            .filter(revenue_insight::Column::IsActive.eq(true))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_active_insights(
        &self,
        insights: &[Insight],
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        if insights.is_empty() {
            return Ok(());
        }

        let models = insights.iter().map(|insight| revenue_insight::ActiveModel {
            impact_tier: Set(insight.impact_tier),
            category: Set(insight.category.clone()),
            title: Set(insight.title.clone()),
            description: Set(insight.description.clone()),
            impact: Set(insight.impact.clone()),
            confidence: Set(i32::from(insight.confidence)),
            is_active: Set(true),
            created_at: Set(created_at),
            ..Default::default()
        });
        RevenueInsight::insert_many(models).exec(self.conn).await?;
        Ok(())
    }

    async fn insert_snapshot(&self, snapshot: &NewSnapshot) -> Result<()> {
        let row = revenue_metric::ActiveModel {
            total_revenue: Set(snapshot.total_revenue),
            projected_revenue: Set(snapshot.projected_revenue),
            optimization_score: Set(i32::from(snapshot.optimization_score)),
            potential_gain: Set(snapshot.potential_gain),
            category: Set(snapshot.category.clone()),
            created_at: Set(snapshot.created_at),
            ..Default::default()
        };
        RevenueMetric::insert(row).exec(self.conn).await?;
        Ok(())
    }
}
