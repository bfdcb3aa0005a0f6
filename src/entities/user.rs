//! User entity - Represents a marketplace member who can both sell and buy.
//!
//! Authentication data is not stored here; the service trusts an upstream layer
//! for identity and only keeps profile and payout bookkeeping.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, unique across the marketplace
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Whether identity verification has been completed
    pub verified: bool,
    /// Account reference at the payment processor, set once onboarding starts
    pub payout_account_id: Option<String>,
    /// Whether the payment processor reports the payout account as usable
    pub payout_account_verified: bool,
    /// When the user registered
    pub joined_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many listings
    #[sea_orm(has_many = "super::listing::Entity")]
    Listings,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
