//! Revenue insight entity - One advisory statement produced by an analysis run.
//!
//! Insights are soft-retired: a new run flips every active row to inactive and
//! inserts its own batch as active.

use super::enums::ImpactTier;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Revenue insight database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenue_insights")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub impact_tier: ImpactTier,
    /// Business area label, e.g. "Pricing"
    pub category: String,
    pub title: String,
    pub description: String,
    /// Estimated monthly effect, e.g. `"+$1,200/month"`
    pub impact: String,
    /// 0-100
    pub confidence: i32,
    /// Only the latest batch is active
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
