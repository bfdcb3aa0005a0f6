//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

// The SeaORM derives generate public items (Column, ActiveModel, PrimaryKey, ...) without docs
#![allow(missing_docs)]

pub mod enums;
pub mod listing;
pub mod revenue_insight;
pub mod revenue_metric;
pub mod transaction;
pub mod user;

pub use enums::{Category, Condition, ImpactTier, ListingStatus, TransactionStatus};

// Re-export specific types to avoid conflicts
pub use listing::{Column as ListingColumn, Entity as Listing, Model as ListingModel};
pub use revenue_insight::{
    Column as RevenueInsightColumn, Entity as RevenueInsight, Model as RevenueInsightModel,
};
pub use revenue_metric::{
    Column as RevenueMetricColumn, Entity as RevenueMetric, Model as RevenueMetricModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
