//! Revenue analytics endpoints.

use super::{AppState, caller::Caller};
use crate::{
    core::analytics::{self, AnalysisReport},
    entities::{revenue_insight, revenue_metric},
    errors::{self, Error},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, instrument};

/// Default number of snapshots returned by the metrics history endpoint.
pub const DEFAULT_METRICS_LIMIT: u64 = 10;
const MAX_METRICS_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize)]
struct AnalyzeRequest {
    category: Option<String>,
}

/// Query of the metrics history endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    /// Number of snapshots, default 10
    pub limit: Option<u64>,
}

/// Reads the optional category filter. A missing or unparsable body means "no filter".
fn requested_category(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<AnalyzeRequest>(body)
        .ok()
        .and_then(|request| request.category)
}

fn analysis_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to analyze revenue" })),
    )
        .into_response()
}

/// `POST /api/revenue/analyze`
#[instrument(skip(state, body))]
pub async fn analyze(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Bytes,
) -> Response {
    let category = requested_category(&body);
    let filter = match analytics::parse_category_filter(category.as_deref()) {
        Ok(filter) => filter,
        Err(err) => return err.into_response(),
    };

    let result: errors::Result<AnalysisReport> = analytics::run_analysis(
        &state.db,
        state.advisor.as_ref(),
        filter,
        state.settings.analytics.atomic_snapshots,
    )
    .await;

    match result {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = %err, caller, "Revenue analysis failed");
            analysis_failed()
        }
    }
}

/// `GET /api/revenue/insights`
pub async fn insights(
    State(state): State<AppState>,
    _caller: Caller,
) -> Result<Json<Vec<revenue_insight::Model>>, Error> {
    Ok(Json(analytics::active_insights(&state.db).await?))
}

/// `GET /api/revenue/metrics?limit=n`
pub async fn metrics(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<Vec<revenue_metric::Model>>, Error> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_METRICS_LIMIT)
        .clamp(1, MAX_METRICS_LIMIT);
    Ok(Json(analytics::recent_metrics(&state.db, limit).await?))
}
