//! Configuration management for `ticketdesk`.
//!
//! Configuration sources (lowest to highest precedence):
//! 1. Defaults
//! 2. User config: `~/.config/ticketdesk/config.yaml`
//! 3. Project config: `.tickets/config.yaml`
//! 4. Environment variables (`TD_*`, plus `TICKETDESK_DB`)
//! 5. CLI overrides
//!
//! Every layer is a flat key/value map; nested YAML mappings are flattened
//! with `.` and keys are normalized to lower-case kebab form.

use crate::error::{Result, TicketError};
use crate::storage::SqliteStorage;
use crate::util::color::ColorStrategy;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the workspace directory.
pub const TICKETS_DIR_NAME: &str = ".tickets";
/// Default database file name inside the workspace directory.
pub const DEFAULT_DB_FILENAME: &str = "tickets.db";
/// Default busy timeout, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// Environment variable that points at a workspace directory directly.
pub const DIR_ENV: &str = "TICKETDESK_DIR";
/// Environment variable that overrides the database path.
pub const DB_ENV: &str = "TICKETDESK_DB";
const ENV_PREFIX: &str = "TD_";

/// One configuration source, as a flat key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Look up a key, normalizing it first.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut flat = HashMap::new();
        flatten_yaml(&value, "", &mut flat);

        let mut layer = Self::default();
        for (key, value) in flat {
            layer.set(&key, value);
        }
        Ok(layer)
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from `(name, value)` pairs shaped like environment variables.
    #[must_use]
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        let mut db_env = None;

        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.set(stripped, value);
            } else if key == DB_ENV {
                db_env = Some(value);
            } else if key == "NO_COLOR" && !value.is_empty() {
                layer.values.entry("no-color".to_string()).or_insert_with(|| "true".to_string());
            }
        }

        if let Some(db) = db_env {
            layer.set("db", db);
        }
        layer
    }
}

/// CLI overrides for config loading.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub lock_timeout: Option<u64>,
    pub no_color: Option<bool>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.set("db", path.to_string_lossy());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer.set("lock-timeout", lock_timeout.to_string());
        }
        if let Some(no_color) = self.no_color {
            layer.set("no-color", no_color.to_string());
        }

        layer
    }
}

/// Settings resolved from the merged layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub tickets_dir: PathBuf,
    pub db_path: PathBuf,
    pub lock_timeout_ms: u64,
    pub no_color: bool,
    pub tag_colors: ColorStrategy,
}

impl ResolvedConfig {
    /// Interpret a merged layer for the workspace at `tickets_dir`.
    ///
    /// A relative `db` path is taken relative to the workspace directory.
    ///
    /// # Errors
    ///
    /// Returns a config error if a value cannot be parsed.
    pub fn from_layer(tickets_dir: &Path, layer: &ConfigLayer) -> Result<Self> {
        let db_path = match layer.get("db").map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => {
                let candidate = PathBuf::from(value);
                if candidate.is_absolute() {
                    candidate
                } else {
                    tickets_dir.join(candidate)
                }
            }
            None => tickets_dir.join(DEFAULT_DB_FILENAME),
        };

        let lock_timeout_ms = match layer.get("lock-timeout") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                TicketError::Config(format!("lock-timeout must be milliseconds, got '{value}'"))
            })?,
            None => DEFAULT_LOCK_TIMEOUT_MS,
        };

        let no_color = match layer.get("no-color") {
            Some(value) => parse_bool(value).ok_or_else(|| {
                TicketError::Config(format!("no-color must be true or false, got '{value}'"))
            })?,
            None => false,
        };

        let tag_colors = match layer.get("tag-colors") {
            Some(value) => value.parse::<ColorStrategy>().map_err(TicketError::Config)?,
            None => ColorStrategy::default(),
        };

        Ok(Self {
            tickets_dir: tickets_dir.to_path_buf(),
            db_path,
            lock_timeout_ms,
            no_color,
            tag_colors,
        })
    }
}

/// Discover the active `.tickets` directory.
///
/// Honors `TICKETDESK_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no workspace is found, or an I/O error if the
/// CWD cannot be read.
pub fn discover_tickets_dir(start: Option<&Path>) -> Result<PathBuf> {
    let env_dir = env::var(DIR_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    discover_tickets_dir_from(start, env_dir.as_deref())
}

fn discover_tickets_dir_from(start: Option<&Path>, env_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = env_dir {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }

    let mut current = match start {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => env::current_dir()?.join(path),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(TICKETS_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(TicketError::NotInitialized)
}

/// Load project config (`.tickets/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(tickets_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&tickets_dir.join("config.yaml"))
}

/// Load user config (`~/.config/ticketdesk/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("ticketdesk")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set("lock-timeout", DEFAULT_LOCK_TIMEOUT_MS.to_string());
    layer.set("no-color", "false");
    layer.set("tag-colors", "random");
    layer
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or a value is invalid.
pub fn load_config(tickets_dir: &Path, cli: &CliOverrides) -> Result<ResolvedConfig> {
    let layer = ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        load_project_config(tickets_dir)?,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]);
    let mut resolved = ResolvedConfig::from_layer(tickets_dir, &layer)?;

    // A path given on the command line is relative to the CWD, not the workspace
    if let Some(db) = &cli.db {
        resolved.db_path.clone_from(db);
    }
    Ok(resolved)
}

/// Open storage using the resolved config, returning the storage and config used.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or the database cannot be opened.
pub fn open_storage(
    tickets_dir: &Path,
    cli: &CliOverrides,
) -> Result<(SqliteStorage, ResolvedConfig)> {
    let config = load_config(tickets_dir, cli)?;
    debug!(
        db = %config.db_path.display(),
        lock_timeout_ms = config.lock_timeout_ms,
        "opening storage"
    );
    let storage = SqliteStorage::open_with_timeout(&config.db_path, Some(config.lock_timeout_ms))?;
    Ok((storage, config))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Bool(v) => {
            out.insert(prefix.to_string(), v.to_string());
        }
        serde_yaml::Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        serde_yaml::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        serde_yaml::Value::Tagged(tagged) => flatten_yaml(&tagged.value, prefix, out),
        serde_yaml::Value::Null | serde_yaml::Value::Sequence(_) => {}
    }
}
