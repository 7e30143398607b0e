//! Error types and handling for `ticketdesk`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Every variant maps onto one [`ErrorKind`]: not-found, conflict,
//!   validation, store-unavailable, or internal
//! - Raw `SQLite` failures are classified with [`TicketError::from_store`]
//! - Provides structured JSON output through [`StructuredError`]

mod structured;

pub use structured::{ErrorCode, StructuredError};

use rusqlite::ErrorCode as SqliteCode;
use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `ticketdesk` operations.
#[derive(Error, Debug)]
pub enum TicketError {
    // === Not found ===
    /// Ticket with the specified ID was not found.
    #[error("Ticket not found: {id}")]
    TicketNotFound { id: i64 },

    /// Tag with the specified ID was not found.
    #[error("Tag not found: {id}")]
    TagNotFound { id: i64 },

    // === Conflict ===
    /// Another tag already uses this name.
    #[error("Tag with this name already exists: {name}")]
    TagNameConflict { name: String },

    // === Validation ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Storage ===
    /// The store could not be reached (busy, locked, unopenable).
    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    // === Workspace / configuration ===
    /// Workspace not initialized.
    #[error("Ticket workspace not initialized: run 'td init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for TicketError {
    fn from(err: rusqlite::Error) -> Self {
        Self::from_store(err)
    }
}

/// Coarse error category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    StoreUnavailable,
    Internal,
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl TicketError {
    /// Classify a raw `SQLite` error.
    ///
    /// Busy/locked/unopenable databases become [`TicketError::StoreUnavailable`];
    /// everything else stays a database error.
    #[must_use]
    pub fn from_store(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            if matches!(
                failure.code,
                SqliteCode::DatabaseBusy
                    | SqliteCode::DatabaseLocked
                    | SqliteCode::CannotOpen
                    | SqliteCode::SystemIoFailure
                    | SqliteCode::NotADatabase
            ) {
                return Self::StoreUnavailable {
                    reason: message.clone().unwrap_or_else(|| failure.to_string()),
                };
            }
        }
        Self::Database(err)
    }

    /// True when the error is a `UNIQUE` constraint violation.
    #[must_use]
    pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == SqliteCode::ConstraintViolation
                    && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    /// The category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TicketNotFound { .. } | Self::TagNotFound { .. } => ErrorKind::NotFound,
            Self::TagNameConflict { .. } => ErrorKind::Conflict,
            Self::Validation { .. } | Self::ValidationErrors { .. } => ErrorKind::Validation,
            Self::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            _ => ErrorKind::Internal,
        }
    }

    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TicketNotFound { .. }
                | Self::TagNotFound { .. }
                | Self::TagNameConflict { .. }
                | Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::NotInitialized
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: td init"),
            Self::TicketNotFound { .. } => Some("Run 'td list' to see available tickets"),
            Self::TagNotFound { .. } => Some("Run 'td tag list' to see available tags"),
            Self::TagNameConflict { .. } => Some("Pick a different name or update the existing tag"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::StoreUnavailable { .. } => Some("Check the database path or retry later"),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create from multiple validation errors.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `TicketError`.
pub type Result<T> = std::result::Result<T, TicketError>;
