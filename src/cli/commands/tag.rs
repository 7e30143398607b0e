//! Tag command implementation.
//!
//! Provides tag management: create, list, show, update, delete, and the
//! attach/detach associations with tickets.

use crate::cli::TagCommands;
use crate::cli::commands::{DeleteResult, open_workspace, use_color};
use crate::config::{CliOverrides, ResolvedConfig};
use crate::error::{Result, TicketError};
use crate::format::{self, TextFormatOptions};
use crate::model::{Tag, Ticket};
use crate::storage::{SqliteStorage, TagUpdate};
use tracing::{debug, info};

/// Execute a tag subcommand.
///
/// # Errors
///
/// Returns an error if database operations fail or if inputs are invalid.
pub fn execute(command: &TagCommands, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut storage, config) = open_workspace(cli)?;
    let storage = &mut storage;

    match command {
        TagCommands::Create { name, color } => {
            tag_create(storage, &config, name, color.as_deref(), json)
        }
        TagCommands::List { skip, limit } => tag_list(storage, &config, *skip, *limit, json),
        TagCommands::Show { id } => tag_show(storage, &config, *id, json),
        TagCommands::Update { id, name, color } => {
            let updates = TagUpdate {
                name: name.clone(),
                color: color.clone(),
            };
            tag_update(storage, &config, *id, &updates, json)
        }
        TagCommands::Delete { id } => tag_delete(storage, *id, json),
        TagCommands::Attach { ticket_id, tag_ids } => {
            let ticket = storage.add_tags_to_ticket(*ticket_id, tag_ids)?;
            info!(ticket_id, tags = ticket.tags.len(), "attached tags");
            report_ticket("Tagged", &ticket, &config, json)
        }
        TagCommands::Detach { ticket_id, tag_id } => {
            let ticket = storage.remove_tag_from_ticket(*ticket_id, *tag_id)?;
            info!(ticket_id, tag_id, "detached tag");
            report_ticket("Untagged", &ticket, &config, json)
        }
    }
}

fn tag_create(
    storage: &mut SqliteStorage,
    config: &ResolvedConfig,
    name: &str,
    color: Option<&str>,
    json: bool,
) -> Result<()> {
    debug!(name, ?color, strategy = ?config.tag_colors, "creating tag");
    let tag = storage.create_tag_with(name, color, config.tag_colors)?;
    info!(tag_id = tag.id, color = %tag.color, "created tag");

    if json {
        return format::print_json(&tag);
    }
    println!("Created {}", describe_tag(&tag, use_color(config)));
    Ok(())
}

fn tag_list(
    storage: &SqliteStorage,
    config: &ResolvedConfig,
    skip: i64,
    limit: i64,
    json: bool,
) -> Result<()> {
    let tags = storage.list_tags(skip, limit)?;

    if json {
        return format::print_json(&tags);
    }

    if tags.is_empty() {
        println!("No tags found.");
        return Ok(());
    }
    let colored = use_color(config);
    for tag in &tags {
        println!("{}", format::format_tag_line(tag, colored));
    }
    Ok(())
}

fn tag_show(storage: &SqliteStorage, config: &ResolvedConfig, id: i64, json: bool) -> Result<()> {
    let tag = storage.get_tag(id)?.ok_or(TicketError::TagNotFound { id })?;

    if json {
        return format::print_json(&tag);
    }
    println!("{}", format::format_tag_line(&tag, use_color(config)));
    println!("Created: {}", tag.tag.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    Ok(())
}

fn tag_update(
    storage: &mut SqliteStorage,
    config: &ResolvedConfig,
    id: i64,
    updates: &TagUpdate,
    json: bool,
) -> Result<()> {
    let tag = storage.update_tag(id, updates)?;
    info!(tag_id = id, noop = updates.is_empty(), "updated tag");

    if json {
        return format::print_json(&tag);
    }
    println!("Updated {}", describe_tag(&tag, use_color(config)));
    Ok(())
}

fn tag_delete(storage: &mut SqliteStorage, id: i64, json: bool) -> Result<()> {
    storage.delete_tag(id)?;
    info!(tag_id = id, "deleted tag");

    if json {
        return format::print_json(&DeleteResult::new("tag", id));
    }
    println!("Deleted tag #{id}");
    Ok(())
}

fn report_ticket(verb: &str, ticket: &Ticket, config: &ResolvedConfig, json: bool) -> Result<()> {
    if json {
        return format::print_json(ticket);
    }
    let options = TextFormatOptions {
        use_color: use_color(config),
        max_width: None,
    };
    println!("{verb} {}", format::format_ticket_line_with(ticket, options));
    Ok(())
}

fn describe_tag(tag: &Tag, use_color: bool) -> String {
    format!(
        "tag #{} {} {}",
        tag.id,
        format::format_tag_badge(tag, use_color),
        tag.color
    )
}
