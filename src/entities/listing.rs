//! Listing entity - An item offered for sale by a user.
//!
//! The `views` counter is bumped on every public fetch, and the category is what
//! revenue analytics group completed sales by.

use super::enums::{Category, Condition, ListingStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Listing database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    /// Unique identifier for the listing
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Seller who created the listing
    pub user_id: i64,
    pub title: String,
    pub description: String,
    /// Asking price in major currency units
    pub price: f64,
    pub category: Category,
    pub condition: Condition,
    pub pickup_location: String,
    pub pickup_instructions: Option<String>,
    pub status: ListingStatus,
    /// Number of public fetches so far
    pub views: i32,
    /// When the listing was created
    pub created_at: DateTimeUtc,
    /// When the listing first became publicly visible
    pub published_at: Option<DateTimeUtc>,
    /// When a purchase of this listing completed
    pub sold_at: Option<DateTimeUtc>,
}

/// Defines relationships between Listing and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each listing belongs to one seller
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One listing can have many purchase attempts
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
