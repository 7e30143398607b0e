use crate::cli::CreateArgs;
use crate::cli::commands::{open_workspace, use_color};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{self, TextFormatOptions};
use crate::storage::TicketCreate;
use std::collections::BTreeSet;
use tracing::info;

/// Execute the create command.
///
/// Unknown tag ids are skipped, not rejected.
///
/// # Errors
///
/// Returns an error if validation fails or the store rejects the insert.
pub fn execute(args: &CreateArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut storage, config) = open_workspace(cli)?;

    let input = TicketCreate {
        title: args.title.clone(),
        description: args.description.clone(),
        tag_ids: args.tags.clone(),
    };
    let ticket = storage.create_ticket(&input)?;
    info!(ticket_id = ticket.id, tags = ticket.tags.len(), "created ticket");

    if json {
        return format::print_json(&ticket);
    }

    let options = TextFormatOptions {
        use_color: use_color(&config),
        max_width: None,
    };
    println!("Created {}", format::format_ticket_line_with(&ticket, options));
    let requested: BTreeSet<i64> = args.tags.iter().copied().collect();
    let skipped = requested.iter().filter(|id| !ticket.has_tag(**id)).count();
    if skipped > 0 {
        eprintln!(
            "Warning: {skipped} of {} tag IDs did not resolve and were skipped",
            requested.len()
        );
    }
    Ok(())
}
