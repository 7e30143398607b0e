//! List command implementation.
//!
//! Thin wrapper over the query engine: CLI strings are resolved leniently
//! the same way the HTTP query string once was.

use crate::cli::ListArgs;
use crate::cli::commands::{open_workspace, use_color};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{self, TextFormatOptions};
use crate::storage::RawTicketQuery;
use std::io::{self, IsTerminal};
use tracing::debug;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the tag id list is malformed or the query fails.
pub fn execute(args: &ListArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let query = raw_query(args).resolve()?;
    debug!(?query, "resolved list query");

    let (storage, config) = open_workspace(cli)?;
    let page = storage.list_tickets(&query)?;

    if json {
        return format::print_json(&page);
    }

    if page.total == 0 {
        println!("No tickets found.");
        return Ok(());
    }

    let options = TextFormatOptions {
        use_color: use_color(&config),
        max_width: io::stdout()
            .is_terminal()
            .then(format::terminal_width),
    };
    for ticket in &page.tickets {
        println!("{}", format::format_ticket_line_with(ticket, options));
    }
    println!();
    println!("{}", format::format_page_footer(&page));
    Ok(())
}

fn raw_query(args: &ListArgs) -> RawTicketQuery {
    RawTicketQuery {
        status: args.status.clone(),
        tag_ids: args.tags.clone(),
        search: args.search.clone(),
        sort_by: args.sort_by.clone(),
        order: args.order.clone(),
        limit: args.limit,
        offset: args.offset,
    }
}
