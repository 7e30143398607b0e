//! Shared utilities for `ticketdesk`.
//!
//! - Tag color generation (random and palette)
//! - Timestamp formatting for storage (fixed-width RFC3339)

pub mod color;
pub mod time;

pub use color::{ColorStrategy, PALETTE, palette_color, random_color};
pub use time::{format_timestamp, now, parse_timestamp};
