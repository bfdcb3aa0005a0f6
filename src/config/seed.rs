//! Seed data loading from a TOML file
//!
//! A seed file lists demo users and the listings they offer. It is applied on
//! start-up by `core::seed::seed_marketplace` when `seed_file` is configured.

use crate::entities::{Category, Condition};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing an entire seed file
#[derive(Debug, Deserialize, Default)]
pub struct SeedConfig {
    /// Users to create
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Listings to create, attached to users by email
    #[serde(default)]
    pub listings: Vec<SeedListing>,
}

/// A single seeded user
#[derive(Debug, Deserialize, Clone)]
pub struct SeedUser {
    /// Login email, matched case-insensitively
    pub email: String,
    /// Display name
    pub name: String,
    /// Profile bio
    #[serde(default)]
    pub bio: Option<String>,
    /// City or area
    #[serde(default)]
    pub location: Option<String>,
    /// Mark the user as verified
    #[serde(default)]
    pub verified: bool,
    /// Payout account reference, if this seller can already receive payments
    #[serde(default)]
    pub payout_account_id: Option<String>,
}

/// A single seeded listing
#[derive(Debug, Deserialize, Clone)]
pub struct SeedListing {
    /// Email of a user declared in the same file
    pub seller_email: String,
    /// Listing title
    pub title: String,
    /// Listing description
    pub description: String,
    /// Asking price
    pub price: f64,
    /// Listing category
    pub category: Category,
    /// Physical condition
    pub condition: Condition,
    /// Pickup point
    pub pickup_location: String,
    /// Starting view count
    #[serde(default)]
    pub views: i32,
}

/// Loads seed data from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;

    parse_seed_config(&contents)
}

/// Parses seed data from a TOML string.
pub fn parse_seed_config(contents: &str) -> Result<SeedConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}
