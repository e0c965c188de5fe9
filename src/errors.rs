// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WypError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("No start script defined")]
    NoStartScript,

    #[error("Directory already configured ({})", .0.display())]
    AlreadyConfigured(PathBuf),

    #[error("Failed to start {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("run group has not been started")]
    NotStarted,

    #[error("run group needs at least one script")]
    EmptyGroup,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WypError>;
