//! Text formatting functions for `ticketdesk`.
//!
//! Provides terminal output for the `td` front end:
//! - Status icons (○ ✓)
//! - Tag badges, colored with the tag's own color
//! - Ticket lines and detail blocks

use crate::model::{Status, Tag, TagWithCount, Ticket, TicketPage};
use crossterm::style::{Color, Stylize};
use std::fmt::Write as _;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Status icon characters.
pub mod icons {
    /// Pending ticket (hollow circle).
    pub const PENDING: &str = "○";
    /// Completed ticket (checkmark).
    pub const COMPLETED: &str = "✓";
}

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
    pub max_width: Option<usize>,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            use_color: false,
            max_width: None,
        }
    }
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Pending => icons::PENDING,
        Status::Completed => icons::COMPLETED,
    }
}

/// Format status label with optional color.
#[must_use]
pub fn format_status_label(status: Status, use_color: bool) -> String {
    let label = status.as_str();
    if !use_color {
        return label.to_string();
    }

    match status {
        Status::Pending => label.yellow().to_string(),
        Status::Completed => label.green().to_string(),
    }
}

/// Format status icon with optional color.
#[must_use]
pub fn format_status_icon_colored(status: Status, use_color: bool) -> String {
    let icon = format_status_icon(status);
    if !use_color {
        return icon.to_string();
    }

    match status {
        Status::Pending => icon.yellow().to_string(),
        Status::Completed => icon.green().to_string(),
    }
}

/// Parse `#RRGGBB` into a terminal color.
#[must_use]
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// Format a tag as a bracketed badge, colored with the tag's color.
#[must_use]
pub fn format_tag_badge(tag: &Tag, use_color: bool) -> String {
    let badge = format!("[{}]", tag.name);
    match hex_to_color(&tag.color) {
        Some(color) if use_color => badge.with(color).to_string(),
        _ => badge,
    }
}

/// Format a ticket's tags as space-separated badges.
#[must_use]
pub fn format_tag_badges(tags: &[Tag], use_color: bool) -> String {
    tags.iter()
        .map(|tag| format_tag_badge(tag, use_color))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Determine terminal width from environment (falls back to 80).
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(value) = columns.trim().parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }
    crossterm::terminal::size().map_or(80, |(cols, _)| usize::from(cols).max(20))
}

fn take_width(text: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw > max {
            break;
        }
        width += cw;
        out.push(c);
    }
    out
}

/// Truncate a title to fit within `max_len` visible columns.
///
/// Handles wide characters (emojis, CJK) using `unicode-width`.
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }
    if max_len <= 3 {
        return take_width(title, max_len);
    }
    let mut out = take_width(title, max_len - 3);
    out.push_str("...");
    out
}

/// Format a single-line ticket summary with options.
///
/// Format: `{icon} #{id} {title} {tags}`
#[must_use]
pub fn format_ticket_line_with(ticket: &Ticket, options: TextFormatOptions) -> String {
    let id = format!("#{}", ticket.id);
    let badges_plain = format_tag_badges(&ticket.tags, false);

    let mut reserved = UnicodeWidthStr::width(format_status_icon(ticket.status)) + 1 + id.len() + 1;
    if !badges_plain.is_empty() {
        reserved += 1 + UnicodeWidthStr::width(badges_plain.as_str());
    }

    let title = options.max_width.map_or_else(
        || ticket.title.clone(),
        |width| truncate_title(&ticket.title, width.saturating_sub(reserved)),
    );

    let icon = format_status_icon_colored(ticket.status, options.use_color);
    let mut line = format!("{icon} {id} {title}");
    if !ticket.tags.is_empty() {
        line.push(' ');
        line.push_str(&format_tag_badges(&ticket.tags, options.use_color));
    }
    line
}

/// Format a single-line ticket summary.
#[must_use]
pub fn format_ticket_line(ticket: &Ticket) -> String {
    format_ticket_line_with(ticket, TextFormatOptions::plain())
}

/// Format the full detail block shown by `td show`.
#[must_use]
pub fn format_ticket_details(ticket: &Ticket, use_color: bool) -> String {
    let heading = format!("#{} {}", ticket.id, ticket.title);
    let mut out = if use_color {
        heading.bold().to_string()
    } else {
        heading
    };
    out.push('\n');

    let _ = writeln!(out, "Status:    {}", format_status_label(ticket.status, use_color));
    if !ticket.tags.is_empty() {
        let _ = writeln!(out, "Tags:      {}", format_tag_badges(&ticket.tags, use_color));
    }
    let _ = writeln!(out, "Created:   {}", ticket.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Updated:   {}", ticket.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(done) = ticket.completed_at {
        let _ = writeln!(out, "Completed: {}", done.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(description) = ticket.description.as_deref().filter(|d| !d.is_empty()) {
        out.push('\n');
        out.push_str(description);
        out.push('\n');
    }
    out
}

/// Format a tag listing line: `#{id} [name] #RRGGBB (n tickets)`.
#[must_use]
pub fn format_tag_line(tag: &TagWithCount, use_color: bool) -> String {
    let noun = if tag.ticket_count == 1 { "ticket" } else { "tickets" };
    format!(
        "#{} {} {} ({} {noun})",
        tag.tag.id,
        format_tag_badge(&tag.tag, use_color),
        tag.tag.color,
        tag.ticket_count
    )
}

/// Summarize which slice of the matching tickets a page holds.
#[must_use]
pub fn format_page_footer(page: &TicketPage) -> String {
    if page.tickets.is_empty() {
        return format!("No tickets shown ({} matching)", page.total);
    }
    let first = page.offset + 1;
    #[allow(clippy::cast_possible_wrap)]
    let last = page.offset + page.tickets.len() as i64;
    format!("Showing {first}-{last} of {}", page.total)
}
