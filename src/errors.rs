//! Unified error types and result handling for the mess manager.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. The HTTP
//! status mapping for these variants lives in the api layer so the core
//! business logic stays framework-agnostic.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or parsing failure
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (config files, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Missing or invalid bearer credential
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the credential was refused
        message: String,
    },

    /// Authenticated caller lacks the required role
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Which role check failed
        message: String,
    },

    /// Referenced record does not exist
    #[error("{what} not found")]
    NotFound {
        /// Human-readable name of the missing record
        what: String,
    },

    /// Request rejected before any write
    #[error("Validation error: {message}")]
    Validation {
        /// Which field or rule was violated
        message: String,
    },

    /// Amount is zero, negative, or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// Duplicate unique-key insert on an explicit create
    #[error("Conflict: {message}")]
    Conflict {
        /// Which uniqueness rule was violated
        message: String,
    },
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
