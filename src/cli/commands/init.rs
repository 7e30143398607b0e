use crate::config::{DEFAULT_DB_FILENAME, TICKETS_DIR_NAME};
use crate::error::{Result, TicketError};
use crate::storage::SqliteStorage;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

const CONFIG_TEMPLATE: &str = r"# ticketdesk workspace configuration
# db: tickets.db
# lock-timeout: 30000
# no-color: false
# tag-colors: random   # or: palette
";

const GITIGNORE_TEMPLATE: &str = r"# Database
*.db
*.db-shm
*.db-wal
";

#[derive(Serialize)]
struct InitResult {
    status: &'static str,
    path: String,
    schema_version: i32,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created.
pub fn execute(force: bool, json: bool, root_dir: Option<&Path>) -> Result<()> {
    let base_dir = root_dir.unwrap_or_else(|| Path::new("."));
    let tickets_dir = base_dir.join(TICKETS_DIR_NAME);
    let db_path = tickets_dir.join(DEFAULT_DB_FILENAME);

    if tickets_dir.exists() {
        if db_path.exists() && !force {
            return Err(TicketError::AlreadyInitialized { path: db_path });
        }
    } else {
        fs::create_dir(&tickets_dir)?;
    }

    // Opening applies the schema; existing rows are left alone.
    let _storage = SqliteStorage::open(&db_path)?;
    info!(path = %db_path.display(), force, "initialized workspace");

    let config_path = tickets_dir.join("config.yaml");
    if !config_path.exists() {
        fs::write(config_path, CONFIG_TEMPLATE)?;
    }

    let gitignore_path = tickets_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(gitignore_path, GITIGNORE_TEMPLATE)?;
    }

    if json {
        return crate::format::print_json(&InitResult {
            status: "initialized",
            path: db_path.display().to_string(),
            schema_version: CURRENT_SCHEMA_VERSION,
        });
    }

    println!("Initialized ticket workspace in {TICKETS_DIR_NAME}/");
    Ok(())
}
