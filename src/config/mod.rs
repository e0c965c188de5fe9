// src/config/mod.rs

//! Configuration loading and validation for wyp.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate script references (`validate.rs`).
//! - Detect a `start` script from project files (`detect.rs`).
//! - Write the starter config for `wyp init` (`scaffold.rs`).

pub mod detect;
pub mod loader;
pub mod model;
pub mod scaffold;
pub mod validate;

pub use detect::{START_SCRIPT, detect_start_script};
pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path};
pub use model::{ConfigFile, InspectorsSection, RawConfigFile, ScriptConfig};
pub use scaffold::write_scaffold;
