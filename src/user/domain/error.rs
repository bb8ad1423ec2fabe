//! Error types for user domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The email address is empty or malformed.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// The email address exceeds the storage limit.
    #[error("email address exceeds {max} characters")]
    EmailTooLong {
        /// Maximum permitted length.
        max: usize,
    },

    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// The username exceeds the storage limit.
    #[error("username exceeds {max} characters")]
    UsernameTooLong {
        /// Maximum permitted length.
        max: usize,
    },

    /// The password does not meet the minimum length.
    #[error("password must contain at least {min} characters")]
    PasswordTooShort {
        /// Minimum permitted length.
        min: usize,
    },

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Error returned while parsing roles from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
