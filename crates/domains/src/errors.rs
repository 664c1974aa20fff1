//! # DomainError
//!
//! Centralized error taxonomy for PetConnect.
//! Every port and service returns this type; inbound adapters decide how each
//! kind is rendered for their transport.

use std::fmt::Display;

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or malformed input (empty message, negative age, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist (Pet, Post, Application, Comment, User).
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// The actor lacks the ownership or role required for the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The same user applied twice for the same pet.
    #[error("user has already applied for this pet")]
    DuplicateApplication,

    /// The pet is not in a status that allows the requested action.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Missing, invalid or expired credentials, or an inactive account.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., email already registered).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (database down, disk full, ...). Surfaced opaquely.
    #[error("internal service error: {0}")]
    Server(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    /// Stable machine-readable name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::DuplicateApplication => "duplicate_application",
            Self::Unavailable(_) => "unavailable",
            Self::Unauthorized(_) => "unauthorized",
            Self::Conflict(_) => "conflict",
            Self::Server(_) => "server_error",
        }
    }
}

/// A specialized Result type for PetConnect logic.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Rejects blank strings and strings longer than `max` characters.
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    check_max_len(field, value, max)
}

pub(crate) fn check_max_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} cannot be longer than {max} characters"
        )));
    }
    Ok(())
}
