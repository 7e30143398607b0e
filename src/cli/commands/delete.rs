use crate::cli::commands::{DeleteResult, open_workspace};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format;
use tracing::info;

/// Execute the delete command. Tag associations go with the ticket.
///
/// # Errors
///
/// Returns `TicketNotFound` if the ticket is absent.
pub fn execute(id: i64, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut storage, _config) = open_workspace(cli)?;
    storage.delete_ticket(id)?;
    info!(ticket_id = id, "deleted ticket");

    if json {
        return format::print_json(&DeleteResult::new("ticket", id));
    }

    println!("Deleted ticket #{id}");
    Ok(())
}
