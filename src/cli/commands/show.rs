use crate::cli::commands::{open_workspace, use_color};
use crate::config::CliOverrides;
use crate::error::{Result, TicketError};
use crate::format;

/// Execute the show command.
///
/// # Errors
///
/// Returns `TicketNotFound` if no ticket has this id.
pub fn execute(id: i64, json: bool, cli: &CliOverrides) -> Result<()> {
    let (storage, config) = open_workspace(cli)?;
    let ticket = storage
        .get_ticket(id)?
        .ok_or(TicketError::TicketNotFound { id })?;

    if json {
        return format::print_json(&ticket);
    }

    print!("{}", format::format_ticket_details(&ticket, use_color(&config)));
    Ok(())
}
