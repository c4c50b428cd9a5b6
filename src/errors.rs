//! Unified error type for the crate.
//!
//! Every fallible operation returns [`Result`]. Validation, conflict, auth,
//! and transport failures each have their own variant so callers can react to
//! the class of error rather than parsing message strings.

use crate::core::lifecycle::InstallStatus;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment is missing or malformed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what was missing or malformed
        message: String,
    },

    /// A submitted field failed validation; nothing was persisted
    #[error("Validation error: {message}")]
    Validation {
        /// User-facing description of the rejected field
        message: String,
    },

    /// A monetary amount was negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// The requested status change is not allowed from the current status
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the install is currently in
        from: InstallStatus,
        /// Status that was requested
        to: InstallStatus,
    },

    /// A mutation was rejected because it conflicts with existing records
    #[error("Conflict: {message}")]
    Conflict {
        /// Explanation of the conflicting state
        message: String,
    },

    /// A referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Identifier that failed to resolve
        id: i64,
    },

    /// Login failed because no account matches the username
    #[error("Username not found")]
    UsernameNotFound,

    /// Login failed because the password does not match
    #[error("Wrong password")]
    WrongPassword,

    /// The acting identity is not allowed to perform the operation
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Explanation of the denied action
        message: String,
    },

    /// A phone number could not be normalized to the national format
    #[error("Invalid phone number: {phone}")]
    InvalidPhone {
        /// The phone number as submitted
        phone: String,
    },

    /// The messaging gateway reported a failure; the triggering state
    /// mutation has already been persisted and is not rolled back
    #[error("Messaging transport error: {message}")]
    Transport {
        /// Detail from the gateway response or the HTTP client
        message: String,
    },

    /// Database error from the storage layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
