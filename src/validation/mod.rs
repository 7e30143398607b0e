//! Validation helpers for `ticketdesk`.
//!
//! These routines enforce ticket and tag field constraints and return
//! structured validation errors without touching storage. Every mutating
//! store operation runs them first, so a rejected input never reaches a
//! transaction.

use crate::error::{Result, TicketError, ValidationError};
use regex::Regex;
use std::sync::LazyLock;

/// Maximum ticket title length, in characters.
pub const MAX_TITLE_LEN: usize = 255;
/// Maximum ticket description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
/// Maximum tag name length, in characters.
pub const MAX_TAG_NAME_LEN: usize = 50;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern compiles"));

fn collect(errors: Vec<ValidationError>) -> std::result::Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates ticket fields.
pub struct TicketValidator;

impl TicketValidator {
    /// Title: required, 1-255 characters.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the title is empty or too long.
    pub fn validate_title(title: &str) -> std::result::Result<(), ValidationError> {
        if title.is_empty() {
            return Err(ValidationError::new("title", "cannot be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::new(
                "title",
                format!("exceeds {MAX_TITLE_LEN} characters"),
            ));
        }
        Ok(())
    }

    /// Description: optional, at most 10000 characters.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the description is too long.
    pub fn validate_description(description: &str) -> std::result::Result<(), ValidationError> {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::new(
                "description",
                format!("exceeds {MAX_DESCRIPTION_LEN} characters"),
            ));
        }
        Ok(())
    }

    /// Validate whichever fields are present and return every violation.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any rule is violated.
    pub fn validate(
        title: Option<&str>,
        description: Option<&str>,
    ) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(title) = title {
            if let Err(e) = Self::validate_title(title) {
                errors.push(e);
            }
        }
        if let Some(description) = description {
            if let Err(e) = Self::validate_description(description) {
                errors.push(e);
            }
        }
        collect(errors)
    }
}

/// Validates tag fields.
pub struct TagValidator;

impl TagValidator {
    /// Name: required, 1-50 characters.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is empty or too long.
    pub fn validate_name(name: &str) -> std::result::Result<(), ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::new("name", "cannot be empty"));
        }
        if name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(ValidationError::new(
                "name",
                format!("exceeds {MAX_TAG_NAME_LEN} characters"),
            ));
        }
        Ok(())
    }

    /// Color: `#RRGGBB`, hex digits in either case.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the color is malformed.
    pub fn validate_color(color: &str) -> std::result::Result<(), ValidationError> {
        if COLOR_RE.is_match(color) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "color",
                "must be in hex format (#RRGGBB)",
            ))
        }
    }

    /// Validate whichever fields are present and return every violation.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any rule is violated.
    pub fn validate(
        name: Option<&str>,
        color: Option<&str>,
    ) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(name) = name {
            if let Err(e) = Self::validate_name(name) {
                errors.push(e);
            }
        }
        if let Some(color) = color {
            if let Err(e) = Self::validate_color(color) {
                errors.push(e);
            }
        }
        collect(errors)
    }
}

/// Parse a comma-separated tag id list such as `"1, 2,,3"`.
///
/// Empty tokens are skipped. Duplicates are kept; the store ignores them.
///
/// # Errors
///
/// Returns a validation error naming the first token that is not an integer.
pub fn parse_tag_ids(input: &str) -> Result<Vec<i64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<i64>().map_err(|_| {
                TicketError::validation("tag_ids", format!("'{token}' is not a valid tag id"))
            })
        })
        .collect()
}
