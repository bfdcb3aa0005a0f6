//! Transaction entity - One purchase of a listing.
//!
//! Created as `PENDING` when a buyer starts checkout and only ever mutated by
//! status transitions afterwards. Rows are never deleted.
use super::enums::TransactionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Listing being bought
    pub listing_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    /// Sale price in major currency units
    pub amount: f64,
    /// Marketplace commission in major currency units
    pub commission: f64,
    /// What the seller receives after commission
    pub seller_payout: f64,
    pub status: TransactionStatus,
    /// When checkout started
    pub created_at: DateTimeUtc,
    pub pickup_scheduled_at: Option<DateTimeUtc>,
    /// Set when the status becomes `COMPLETED`
    pub completed_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub cancellation_reason: Option<String>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction is for one listing
    #[sea_orm(
        belongs_to = "super::listing::Entity",
        from = "Column::ListingId",
        to = "super::listing::Column::Id"
    )]
    Listing,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
