//! String-backed enumerations shared by several tables.
//!
//! Each enum is stored as its upper-case (or kebab-case, for impact tiers) name so the
//! database stays readable without a lookup table.

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed set of listing categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum,
    Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[sea_orm(string_value = "CLOTHING")]
    Clothing,
    #[sea_orm(string_value = "JEWELRY")]
    Jewelry,
    #[sea_orm(string_value = "WATCHES")]
    Watches,
    #[sea_orm(string_value = "PURSES")]
    Purses,
    #[sea_orm(string_value = "CROCKERY")]
    Crockery,
    #[sea_orm(string_value = "ELECTRONICS")]
    Electronics,
    #[sea_orm(string_value = "FURNITURE")]
    Furniture,
    #[sea_orm(string_value = "BOOKS")]
    Books,
    #[sea_orm(string_value = "TOYS")]
    Toys,
    #[sea_orm(string_value = "SPORTS")]
    Sports,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl Category {
    /// Canonical stored name, e.g. `"ELECTRONICS"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clothing => "CLOTHING",
            Self::Jewelry => "JEWELRY",
            Self::Watches => "WATCHES",
            Self::Purses => "PURSES",
            Self::Crockery => "CROCKERY",
            Self::Electronics => "ELECTRONICS",
            Self::Furniture => "FURNITURE",
            Self::Books => "BOOKS",
            Self::Toys => "TOYS",
            Self::Sports => "SPORTS",
            Self::Other => "OTHER",
        }
    }

    /// Key used in the per-category breakdown of a marketplace summary.
    #[must_use]
    pub fn summary_key(self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::errors::Error;

    /// Case-insensitive match against the stored names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| crate::errors::Error::UnknownCategory {
                name: s.to_string(),
            })
    }
}

/// Physical condition of a listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "LIKE_NEW")]
    LikeNew,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "FAIR")]
    Fair,
    #[sea_orm(string_value = "POOR")]
    Poor,
}

/// Listing visibility / sale state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "SOLD")]
    Sold,
    #[sea_orm(string_value = "REMOVED")]
    Removed,
    #[sea_orm(string_value = "FLAGGED")]
    Flagged,
}

/// Purchase lifecycle.
///
/// `Pending -> PaymentCompleted -> Completed`, with `Cancelled` reachable from
/// any state before `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PAYMENT_COMPLETED")]
    PaymentCompleted,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl TransactionStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::PaymentCompleted | Self::Cancelled)
                | (Self::PaymentCompleted, Self::Completed | Self::Cancelled)
        )
    }

    /// Stored name, e.g. `"PAYMENT_COMPLETED"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PaymentCompleted => "PAYMENT_COMPLETED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// How strongly an insight is expected to move revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ImpactTier {
    #[sea_orm(string_value = "critical")]
    #[serde(rename = "critical")]
    Critical,
    #[sea_orm(string_value = "high-impact")]
    #[serde(rename = "high-impact")]
    HighImpact,
    #[sea_orm(string_value = "medium-impact")]
    #[serde(rename = "medium-impact")]
    MediumImpact,
}
