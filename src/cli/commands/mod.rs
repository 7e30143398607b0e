//! Command implementations for the `td` binary.

pub mod complete;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod show;
pub mod tag;
pub mod update;
pub mod version;

use crate::config::{self, CliOverrides, ResolvedConfig};
use crate::error::Result;
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::Path;

/// Discover the workspace from the CWD and open its store.
pub(crate) fn open_workspace(cli: &CliOverrides) -> Result<(SqliteStorage, ResolvedConfig)> {
    let tickets_dir = config::discover_tickets_dir(Some(Path::new(".")))?;
    config::open_storage(&tickets_dir, cli)
}

/// Color only when enabled in config and stdout is a terminal.
pub(crate) fn use_color(config: &ResolvedConfig) -> bool {
    !config.no_color && io::stdout().is_terminal()
}

/// JSON output for deletions.
#[derive(Serialize)]
pub(crate) struct DeleteResult {
    pub status: &'static str,
    pub kind: &'static str,
    pub id: i64,
}

impl DeleteResult {
    pub(crate) const fn new(kind: &'static str, id: i64) -> Self {
        Self {
            status: "deleted",
            kind,
            id,
        }
    }
}
