//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Ticket tracker with tags, filtered queries, and a completion lifecycle
#[derive(Parser, Debug)]
#[command(name = "td", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (defaults to .tickets/tickets.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a ticket workspace
    Init {
        /// Re-apply the schema even if the database exists
        #[arg(long)]
        force: bool,
    },

    /// Create a new ticket
    Create(CreateArgs),

    /// List tickets
    List(ListArgs),

    /// Show ticket details
    Show {
        /// Ticket ID
        id: i64,
    },

    /// Update a ticket's title or description
    Update(UpdateArgs),

    /// Delete a ticket
    Delete {
        /// Ticket ID
        id: i64,
    },

    /// Mark a ticket completed
    Complete {
        /// Ticket ID
        id: i64,
    },

    /// Return a completed ticket to pending
    Uncomplete {
        /// Ticket ID
        id: i64,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Ticket title
    pub title: String,

    /// Description
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// Tag IDs to attach (repeatable or comma-separated)
    #[arg(long = "tag", value_delimiter = ',')]
    pub tags: Vec<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Filter by status (pending, completed)
    #[arg(long)]
    pub status: Option<String>,

    /// Only tickets carrying any of these tag IDs (comma-separated)
    #[arg(long = "tag")]
    pub tags: Option<String>,

    /// Case-insensitive substring match on title or description
    #[arg(long)]
    pub search: Option<String>,

    /// Sort field (created_at, updated_at, completed_at)
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort order (asc, desc)
    #[arg(long)]
    pub order: Option<String>,

    /// Maximum number of results (0 = unlimited)
    #[arg(long)]
    pub limit: Option<i64>,

    /// Number of matching tickets to skip
    #[arg(long)]
    pub offset: Option<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Ticket ID
    pub id: i64,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Create a tag
    Create {
        /// Tag name
        name: String,

        /// Color as #RRGGBB (assigned automatically if omitted)
        #[arg(long)]
        color: Option<String>,
    },

    /// List tags with ticket counts
    List {
        /// Number of tags to skip
        #[arg(long, default_value_t = 0)]
        skip: i64,

        /// Maximum number of tags (1-1000)
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },

    /// Show a tag
    Show {
        /// Tag ID
        id: i64,
    },

    /// Rename or recolor a tag
    Update {
        /// Tag ID
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a tag (detaches it from every ticket)
    Delete {
        /// Tag ID
        id: i64,
    },

    /// Attach tags to a ticket
    Attach {
        /// Ticket ID
        ticket_id: i64,

        /// Tag IDs
        #[arg(required = true, value_delimiter = ',')]
        tag_ids: Vec<i64>,
    },

    /// Detach a tag from a ticket
    Detach {
        /// Ticket ID
        ticket_id: i64,

        /// Tag ID
        tag_id: i64,
    },
}
