//! Complete and uncomplete commands.

use crate::cli::commands::{open_workspace, use_color};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{self, TextFormatOptions};
use crate::model::Ticket;

/// Execute the complete command.
///
/// # Errors
///
/// Returns `TicketNotFound` if the ticket is absent.
pub fn execute(id: i64, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut storage, config) = open_workspace(cli)?;
    let ticket = storage.complete_ticket(id)?;
    report("Completed", &ticket, json, use_color(&config))
}

/// Execute the uncomplete command.
///
/// # Errors
///
/// Returns `TicketNotFound` if the ticket is absent.
pub fn execute_uncomplete(id: i64, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut storage, config) = open_workspace(cli)?;
    let ticket = storage.uncomplete_ticket(id)?;
    report("Reopened", &ticket, json, use_color(&config))
}

fn report(verb: &str, ticket: &Ticket, json: bool, use_color: bool) -> Result<()> {
    if json {
        return format::print_json(ticket);
    }
    let options = TextFormatOptions {
        use_color,
        max_width: None,
    };
    println!("{verb} {}", format::format_ticket_line_with(ticket, options));
    Ok(())
}
