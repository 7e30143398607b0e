//! Structured error output.
//!
//! Provides machine-parseable error information with:
//! - Stable error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - The exit code and the HTTP status an outer layer should use

use crate::error::TicketError;
use crossterm::style::Stylize;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Store Errors (exit code 2) ===
    /// Store busy, locked, or unreachable
    StoreUnavailable,
    /// Database operation failed
    DatabaseError,
    /// Workspace not initialized
    NotInitialized,
    /// Already initialized
    AlreadyInitialized,

    // === Not Found (exit code 3) ===
    TicketNotFound,
    TagNotFound,

    // === Validation Errors (exit code 4) ===
    /// Field validation failed
    ValidationFailed,

    // === Conflict (exit code 5) ===
    /// Tag name already taken
    TagNameConflict,

    // === Config Errors (exit code 7) ===
    ConfigError,

    // === I/O Errors (exit code 8) ===
    IoError,
    JsonError,
    YamlError,

    // === Internal Errors (exit code 1) ===
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::TagNotFound => "TAG_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::TagNameConflict => "TAG_NAME_CONFLICT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// A busy store may succeed after waiting; a validation error may
    /// succeed once the input is fixed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable | Self::ValidationFailed)
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Store errors
    /// - 3: Not found
    /// - 4: Validation errors
    /// - 5: Conflicts
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::StoreUnavailable
            | Self::DatabaseError
            | Self::NotInitialized
            | Self::AlreadyInitialized => 2,
            Self::TicketNotFound | Self::TagNotFound => 3,
            Self::ValidationFailed => 4,
            Self::TagNameConflict => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }

    /// The HTTP status an outer request layer should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::TicketNotFound | Self::TagNotFound => 404,
            Self::TagNameConflict => 409,
            Self::ValidationFailed => 400,
            Self::StoreUnavailable => 503,
            _ => 500,
        }
    }
}

impl From<&TicketError> for ErrorCode {
    fn from(err: &TicketError) -> Self {
        match err {
            TicketError::TicketNotFound { .. } => Self::TicketNotFound,
            TicketError::TagNotFound { .. } => Self::TagNotFound,
            TicketError::TagNameConflict { .. } => Self::TagNameConflict,
            TicketError::Validation { .. } | TicketError::ValidationErrors { .. } => {
                Self::ValidationFailed
            }
            TicketError::StoreUnavailable { .. } => Self::StoreUnavailable,
            TicketError::Database(_) => Self::DatabaseError,
            TicketError::NotInitialized => Self::NotInitialized,
            TicketError::AlreadyInitialized { .. } => Self::AlreadyInitialized,
            TicketError::Config(_) => Self::ConfigError,
            TicketError::Io(_) => Self::IoError,
            TicketError::Json(_) => Self::JsonError,
            TicketError::Yaml(_) => Self::YamlError,
            TicketError::Other(_) => Self::InternalError,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `TicketError`.
    #[must_use]
    pub fn from_error(err: &TicketError) -> Self {
        let code = ErrorCode::from(err);
        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
            context: Self::context_for(err),
        }
    }

    fn context_for(err: &TicketError) -> Option<Value> {
        match err {
            TicketError::TicketNotFound { id } => Some(json!({ "ticket_id": id })),
            TicketError::TagNotFound { id } => Some(json!({ "tag_id": id })),
            TicketError::TagNameConflict { name } => Some(json!({ "name": name })),
            TicketError::Validation { field, reason } => {
                Some(json!({ "field": field, "reason": reason }))
            }
            TicketError::ValidationErrors { errors } => Some(json!({
                "errors": errors
                    .iter()
                    .map(|e| json!({ "field": e.field, "reason": e.message }))
                    .collect::<Vec<_>>()
            })),
            _ => None,
        }
    }

    /// Render as the JSON envelope printed on stderr.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "http_status": self.code.http_status(),
                "context": self.context,
            }
        })
    }

    /// Render for a human reader, optionally with color.
    #[must_use]
    pub fn to_human(&self, use_color: bool) -> String {
        let mut out = if use_color {
            format!("{} {}", "Error:".red().bold(), self.message)
        } else {
            format!("Error: {}", self.message)
        };
        if let Some(hint) = &self.hint {
            out.push('\n');
            if use_color {
                out.push_str(&format!("{} {hint}", "Hint:".yellow()));
            } else {
                out.push_str(&format!("Hint: {hint}"));
            }
        }
        out
    }
}
