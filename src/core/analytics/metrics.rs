//! Metrics aggregation - point-in-time marketplace summary.
//!
//! The summary covers a fixed trailing window of [`WINDOW_DAYS`] days ending at the
//! moment of invocation. All reads are independent and issued concurrently; store
//! failures propagate unchanged and no partial summary is ever returned.

use super::round2;
use super::store::MarketplaceStore;
use crate::{entities::Category, errors::Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Length of the trailing analysis window.
pub const WINDOW_DAYS: i64 = 30;

/// Derived figures for one category within the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    /// Completed-sale revenue for the category
    pub revenue: f64,
    /// Active listing count
    pub listings: i64,
    /// Mean price of active listings, 0 when unknown
    pub avg_price: f64,
    /// Completed sales per 100 views, view count floored at 1
    pub conversion: f64,
}

/// Marketplace-wide summary handed to the advisory generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSummary {
    /// Completed-sale revenue in the window
    pub total_revenue: f64,
    /// Active listings matching the filter
    pub total_listings: u64,
    /// Users who created at least one listing in the window
    pub active_users: u64,
    /// Completed sales matching the filter
    pub completed_sales: u64,
    /// `total_revenue / completed_sales`, 0 when there were no sales
    pub avg_order_value: f64,
    /// Completed sales per 100 views across the filtered listings
    pub conversion_rate: f64,
    /// Keyed by lower-cased category name
    pub categories: BTreeMap<String, CategoryAggregate>,
}

/// Summarises the marketplace for the last [`WINDOW_DAYS`] days.
pub async fn aggregate_marketplace<S: MarketplaceStore>(
    store: &S,
    filter: Option<Category>,
) -> Result<MarketplaceSummary> {
    aggregate_marketplace_at(store, filter, Utc::now()).await
}

/// Summarises the window ending at `now`.
///
/// The per-category breakdown covers every category that has active listings,
/// independent of `filter`.
#[instrument(skip(store))]
pub async fn aggregate_marketplace_at<S: MarketplaceStore>(
    store: &S,
    filter: Option<Category>,
    now: DateTime<Utc>,
) -> Result<MarketplaceSummary> {
    let since = now - Duration::days(WINDOW_DAYS);

    let (sales, active_users, total_listings, groups, total_views) = tokio::try_join!(
        store.completed_sales_since(since, filter),
        store.count_users_listing_since(since),
        store.count_active_listings(filter),
        store.active_category_groups(),
        store.total_views(filter),
    )?;

    let total_revenue: f64 = sales.iter().map(|s| s.amount).sum();

    let mut categories = BTreeMap::new();
    for group in groups {
        let (category_sales, category_views) = tokio::try_join!(
            store.completed_sales_since(since, Some(group.category)),
            store.total_views(Some(group.category)),
        )?;

        categories.insert(
            group.category.summary_key(),
            CategoryAggregate {
                revenue: category_sales.iter().map(|s| s.amount).sum(),
                listings: group.listing_count,
                avg_price: group.avg_price.unwrap_or(0.0),
                conversion: conversion_rate(category_sales.len(), category_views),
            },
        );
    }

    debug!(
        sales = sales.len(),
        total_revenue,
        categories = categories.len(),
        "Aggregated marketplace window"
    );

    Ok(MarketplaceSummary {
        total_revenue,
        total_listings,
        active_users,
        completed_sales: sales.len() as u64,
        avg_order_value: average_order_value(total_revenue, sales.len()),
        conversion_rate: conversion_rate(sales.len(), total_views),
        categories,
    })
}

/// Revenue per completed sale, rounded to cents; 0 when there were no sales.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_order_value(total_revenue: f64, sales: usize) -> f64 {
    if sales == 0 {
        return 0.0;
    }
    round2(total_revenue / sales as f64)
}

/// Completed sales per 100 views, rounded to 2 decimals.
///
/// The view denominator is floored at 1, so zero views never divides by zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn conversion_rate(sales: usize, views: i64) -> f64 {
    let denominator = views.max(1) as f64;
    round2(sales as f64 / denominator * 100.0)
}
