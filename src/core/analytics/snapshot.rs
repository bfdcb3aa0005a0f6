//! Snapshot writer - insight rotation and the derived revenue metrics.

use super::advisory::Insight;
use super::round2;
use super::store::{NewSnapshot, SnapshotStore};
use crate::{entities::Category, errors::Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Baseline of the optimization score before insights and projected growth are added.
const SCORE_BASELINE: f64 = 60.0;
/// Score points contributed by every insight in the batch.
const SCORE_PER_INSIGHT: f64 = 5.0;

/// Figures derived from one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueMetrics {
    /// Current revenue plus [`potential_gain`](Self::potential_gain)
    pub projected_revenue: f64,
    /// Percentage growth over current revenue, 0 when there is no revenue yet
    pub revenue_increase: f64,
    /// Heuristic 0-100 score; not a statistical estimate
    pub optimization_score: u8,
    /// Sum of the dollar amounts quoted by the insights
    pub potential_gain: f64,
}

/// Extracts the dollar amount from an impact string such as `+$1,200/month`.
///
/// Takes the first `$` that is followed by digits (commas allowed) and ignores
/// everything after that run. Returns `None` when no such amount exists.
#[must_use]
pub fn parse_dollar_impact(impact: &str) -> Option<u64> {
    impact.match_indices('$').find_map(|(idx, _)| {
        let digits: String = impact[idx + 1..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    })
}

/// Sum of the parsed impacts; unparseable impacts count as 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn potential_gain(insights: &[Insight]) -> f64 {
    insights
        .iter()
        .map(|i| parse_dollar_impact(&i.impact).unwrap_or(0) as f64)
        .sum()
}

/// Derives projected revenue, growth and the optimization score.
///
/// `score = clamp(round(60 + 5 * insights + revenue_increase), 0, 100)`
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
/// Derives projection, increase and score from a revenue total and an insight batch.
pub fn compute_metrics(total_revenue: f64, insights: &[Insight]) -> RevenueMetrics {
    let potential_gain = potential_gain(insights);
    let projected_revenue = total_revenue + potential_gain;
    let revenue_increase = if total_revenue > 0.0 {
        round2((projected_revenue - total_revenue) / total_revenue * 100.0)
    } else {
        0.0
    };

    let raw_score =
        SCORE_PER_INSIGHT.mul_add(insights.len() as f64, SCORE_BASELINE) + revenue_increase;
    let optimization_score = raw_score.round().clamp(0.0, 100.0) as u8;

    RevenueMetrics {
        projected_revenue,
        revenue_increase,
        optimization_score,
        potential_gain,
    }
}

/// Persists one run: retire every active insight, activate the new batch, then append
/// the metric snapshot.
///
/// Steps run in that order against `store`; whether they are atomic depends on the store
/// (a transaction-backed `OrmStore` rolls all three back together).
#[instrument(skip(store, insights, metrics), fields(insights = insights.len()))]
pub async fn write_snapshot<S: SnapshotStore>(
    store: &S,
    total_revenue: f64,
    insights: &[Insight],
    metrics: &RevenueMetrics,
    filter: Option<Category>,
) -> Result<()> {
    let now = Utc::now();

    let retired = store.deactivate_active_insights().await?;
    debug!(retired, "Deactivated previous insight batch");

    store.insert_active_insights(insights, now).await?;

    store
        .insert_snapshot(&NewSnapshot {
            total_revenue,
            projected_revenue: metrics.projected_revenue,
            optimization_score: metrics.optimization_score,
            potential_gain: metrics.potential_gain,
            category: filter.map(|c| c.as_str().to_string()),
            created_at: now,
        })
        .await?;

    info!(
        total_revenue,
        projected = metrics.projected_revenue,
        "Wrote revenue snapshot"
    );
    Ok(())
}
