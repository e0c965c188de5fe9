// src/config/loader.rs

use std::path::Path;

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// A missing file is not an error: it yields an empty configuration, since a
/// project may rely entirely on start-script detection. This only performs
/// TOML deserialization; use [`load_and_validate`] for the checked form.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();

    if !fs.exists(path) {
        debug!(?path, "no config file found; using empty configuration");
        return Ok(RawConfigFile::default());
    }

    let contents = fs.read_to_string(path)?;
    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and validate it.
///
/// This is the entry point for the rest of the application:
///
/// - Reads TOML (or falls back to an empty config).
/// - Checks `combine` references and `env` entries.
/// - Backfills script names from their table keys.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, &path)?;
    ConfigFile::try_from(raw_config)
}

/// Config file looked up in the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wyp.toml";
