/// Database configuration and connection management
pub mod database;

/// Seed data loading from a TOML file
pub mod seed;

/// Application settings from config.toml plus environment overrides
pub mod settings;
