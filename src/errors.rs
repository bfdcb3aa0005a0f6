//! Unified error types for the marketplace service.
//!
//! Every business operation returns [`Result`], and store failures are carried
//! through unchanged so the transport layer decides how much to reveal.

use thiserror::Error;

/// All errors produced by the marketplace crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings or seed file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any failure reported by the ORM / database driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Caller-supplied data failed validation
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Which rule was violated
        message: String,
    },

    /// A monetary amount was zero, negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Category string does not name a known listing category
    #[error("Unknown category: {name}")]
    UnknownCategory {
        /// The rejected category string
        name: String,
    },

    /// No listing has this ID
    #[error("Listing not found: {id}")]
    ListingNotFound {
        /// The missing listing ID
        id: i64,
    },

    /// No user has this ID
    #[error("User not found: {id}")]
    UserNotFound {
        /// The missing user ID
        id: i64,
    },

    /// No purchase has this ID
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// The missing transaction ID
        id: i64,
    },

    /// The request carried no usable caller identity
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the identity was rejected
        message: String,
    },

    /// The caller is not allowed to touch this record
    #[error("Forbidden: {message}")]
    Forbidden {
        /// What the caller tried to do
        message: String,
    },

    /// A unique value (e.g. email) is already taken
    #[error("Conflict: {message}")]
    Conflict {
        /// What collided
        message: String,
    },

    /// Listing is not in a purchasable state
    #[error("Listing {id} is not available")]
    ListingUnavailable {
        /// The listing that cannot be bought
        id: i64,
    },

    /// A transaction status change that the lifecycle does not allow
    #[error("Cannot move transaction {id} from {from} to {to}")]
    InvalidTransition {
        /// Transaction ID
        id: i64,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// The advisory generator answered with something we cannot accept
    #[error("Advisory generator error: {message}")]
    Advisory {
        /// What was wrong with the reply
        message: String,
    },

    /// Transport failure talking to the advisory API
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment variable was missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
