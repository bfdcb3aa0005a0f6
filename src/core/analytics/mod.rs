//! Revenue analytics - marketplace snapshot aggregation.
//!
//! One analysis run reads the transaction and listing stores, summarises the trailing
//! 30 days, asks an [`AdvisoryGenerator`] for insights and recommendations, and persists
//! the outcome as a new active insight batch plus one revenue metric snapshot.
//!
//! Data flow: [`metrics::aggregate_marketplace`] -> [`advisory`] -> [`snapshot::write_snapshot`].
//! Nothing is written until both advisory calls have succeeded, so a failed run leaves
//! no partial snapshot behind.

/// Insight and recommendation types, the generator trait and its fallback
pub mod advisory;
/// Language model backed advisory generator
pub mod llm;
/// Marketplace metrics aggregation
pub mod metrics;
/// Derived metrics and snapshot persistence
pub mod snapshot;
/// Store access traits and their SeaORM implementation
pub mod store;

pub use advisory::{AdvisoryGenerator, FallbackAdvisor, Insight, Recommendation};
pub use llm::LanguageModelAdvisor;
pub use metrics::{CategoryAggregate, MarketplaceSummary, aggregate_marketplace};
pub use snapshot::RevenueMetrics;
pub use store::{MarketplaceStore, OrmStore, SnapshotStore};

use crate::{
    entities::{Category, RevenueInsight, RevenueMetric, revenue_insight, revenue_metric},
    errors::Result,
};
use sea_orm::{DatabaseConnection, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// Sentinel category meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Everything one analysis run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Derived projection and score
    pub metrics: RevenueMetrics,
    /// The batch that is now active
    pub insights: Vec<Insight>,
    /// Actions derived from the insights
    pub recommendations: Vec<Recommendation>,
}

/// Turns an optional request category into a filter.
///
/// `None`, an empty string and `"all"` (any case) mean unfiltered; anything else must
/// name a listing category.
pub fn parse_category_filter(raw: Option<&str>) -> Result<Option<Category>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case(ALL_CATEGORIES) => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

/// Rounds to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs one analysis against any store, writing the snapshot step by step.
///
/// Insight rotation is deactivate-then-insert without a transaction: a failure between
/// the two leaves zero active insights until the next successful run.
#[instrument(skip(store, advisor))]
pub async fn analyze_revenue<S, A>(
    store: &S,
    advisor: &A,
    filter: Option<Category>,
) -> Result<AnalysisReport>
where
    S: MarketplaceStore + SnapshotStore,
    A: AdvisoryGenerator,
{
    let summary = aggregate_marketplace(store, filter).await?;
    let (insights, recommendations) = advise(advisor, &summary).await?;
    let metrics = snapshot::compute_metrics(summary.total_revenue, &insights);

    snapshot::write_snapshot(store, summary.total_revenue, &insights, &metrics, filter).await?;

    Ok(AnalysisReport {
        metrics,
        insights,
        recommendations,
    })
}

/// Same as [`analyze_revenue`], but the snapshot writes share one database transaction.
///
/// Any failure while rotating insights or appending the metric row rolls everything back,
/// so the previous batch stays active.
#[instrument(skip(db, advisor))]
pub async fn analyze_revenue_atomic<A>(
    db: &DatabaseConnection,
    advisor: &A,
    filter: Option<Category>,
) -> Result<AnalysisReport>
where
    A: AdvisoryGenerator,
{
    let summary = aggregate_marketplace(&OrmStore::new(db), filter).await?;
    let (insights, recommendations) = advise(advisor, &summary).await?;
    let metrics = snapshot::compute_metrics(summary.total_revenue, &insights);

    let txn = db.begin().await?;
    snapshot::write_snapshot(
        &OrmStore::new(&txn),
        summary.total_revenue,
        &insights,
        &metrics,
        filter,
    )
    .await?;
    txn.commit().await?;

    Ok(AnalysisReport {
        metrics,
        insights,
        recommendations,
    })
}

/// Entry point used by the HTTP layer; picks the snapshot mode from settings.
pub async fn run_analysis<A>(
    db: &DatabaseConnection,
    advisor: &A,
    filter: Option<Category>,
    atomic: bool,
) -> Result<AnalysisReport>
where
    A: AdvisoryGenerator,
{
    let report = if atomic {
        analyze_revenue_atomic(db, advisor, filter).await?
    } else {
        analyze_revenue(&OrmStore::new(db), advisor, filter).await?
    };

    info!(
        score = report.metrics.optimization_score,
        insights = report.insights.len(),
        "Revenue analysis finished"
    );
    Ok(report)
}

async fn advise<A: AdvisoryGenerator>(
    advisor: &A,
    summary: &MarketplaceSummary,
) -> Result<(Vec<Insight>, Vec<Recommendation>)> {
    let insights = advisor.generate_insights(summary).await?;
    let recommendations = advisor.generate_recommendations(&insights).await?;
    Ok((insights, recommendations))
}

/// Currently active insights, newest first.
pub async fn active_insights(db: &DatabaseConnection) -> Result<Vec<revenue_insight::Model>> {
    RevenueInsight::find()
        .filter(revenue_insight::Column::IsActive.eq(true))
        .order_by_desc(revenue_insight::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Most recent metric snapshots, newest first.
pub async fn recent_metrics(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<revenue_metric::Model>> {
    RevenueMetric::find()
        .order_by_desc(revenue_metric::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
