//! Output formatting for `ticketdesk`.
//!
//! Human-readable text for terminals, and JSON for scripts. With `--json`
//! (or when stdout is not a terminal) commands print clean JSON to stdout
//! with diagnostics on stderr.

mod text;

pub use text::{
    TextFormatOptions, format_page_footer, format_status_icon, format_status_icon_colored,
    format_status_label, format_tag_badge, format_tag_badges, format_tag_line,
    format_ticket_details, format_ticket_line, format_ticket_line_with, hex_to_color,
    terminal_width, truncate_title,
};

use crate::error::Result;
use serde::Serialize;

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
