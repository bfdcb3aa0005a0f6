//! Revenue metric entity - Append-only snapshot written once per analysis run.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Revenue metric snapshot database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenue_metrics")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Completed-sale revenue in the analysed window
    pub total_revenue: f64,
    /// `total_revenue + potential_gain`
    pub projected_revenue: f64,
    /// Heuristic health score in 0-100
    pub optimization_score: i32,
    /// Sum of the dollar impacts of the run's insights
    pub potential_gain: f64,
    /// Category filter of the run, `None` when unfiltered
    pub category: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
