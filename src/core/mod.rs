/// Revenue analytics - marketplace aggregation, advisory generation and snapshots
pub mod analytics;

/// Listing creation, browsing and owner maintenance
pub mod listing;

/// Purchase lifecycle from checkout to pickup
pub mod purchase;

/// Demo data seeding from a seed file
pub mod seed;

/// Registration, profiles and per-user statistics
pub mod user;
