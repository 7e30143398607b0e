use crate::cli::UpdateArgs;
use crate::cli::commands::{open_workspace, use_color};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{self, TextFormatOptions};
use crate::storage::TicketUpdate;
use tracing::info;

/// Execute the update command.
///
/// With no fields given the ticket is printed unchanged.
///
/// # Errors
///
/// Returns `TicketNotFound` if the ticket is absent, or a validation error.
pub fn execute(args: &UpdateArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut storage, config) = open_workspace(cli)?;

    let updates = build_update(args);
    let ticket = storage.update_ticket(args.id, &updates)?;
    info!(ticket_id = ticket.id, noop = updates.is_empty(), "updated ticket");

    if json {
        return format::print_json(&ticket);
    }

    let options = TextFormatOptions {
        use_color: use_color(&config),
        max_width: None,
    };
    println!("Updated {}", format::format_ticket_line_with(&ticket, options));
    Ok(())
}

fn build_update(args: &UpdateArgs) -> TicketUpdate {
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.clone().map(Some)
    };
    TicketUpdate {
        title: args.title.clone(),
        description,
    }
}
