//! Version command implementation.

use crate::error::Result;
use crate::format;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    schema_version: i32,
}

fn build_kind() -> &'static str {
    if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    }
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = build_kind();

    if json {
        return format::print_json(&VersionOutput {
            version,
            build,
            schema_version: CURRENT_SCHEMA_VERSION,
        });
    }

    println!("td version {version} ({build})");
    Ok(())
}
