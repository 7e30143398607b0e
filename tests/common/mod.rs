#![allow(dead_code)]

use std::path::Path;
use std::sync::Once;
use std::time::Instant;
use tempfile::TempDir;
use ticketdesk::storage::SqliteStorage;
use tracing::info;

pub mod cli;
pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        ticketdesk::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl TestLogGuard {
    fn new(name: &str) -> Self {
        init_test_logging();
        info!("{name}: starting");
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    TestLogGuard::new(name)
}

pub fn test_db() -> SqliteStorage {
    init_test_logging();
    SqliteStorage::open_memory().expect("Failed to create test database")
}

/// File-backed store, for tests that need a second connection.
pub fn test_db_with_dir() -> (SqliteStorage, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = db_path_in(dir.path());
    std::fs::create_dir_all(db_path.parent().unwrap()).unwrap();
    let storage = SqliteStorage::open(&db_path).expect("Failed to create test database");
    (storage, dir)
}

pub fn db_path_in(root: &Path) -> std::path::PathBuf {
    root.join(".tickets").join("tickets.db")
}

/// Rewrite a ticket column directly, bypassing the store.
pub fn set_ticket_column(dir: &TempDir, id: i64, column: &str, value: Option<&str>) {
    let conn = rusqlite::Connection::open(db_path_in(dir.path())).expect("open raw connection");
    conn.execute(
        &format!("UPDATE tickets SET {column} = ?1 WHERE id = ?2"),
        rusqlite::params![value, id],
    )
    .expect("raw update");
}
