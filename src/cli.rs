// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `wyp`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wyp",
    version,
    about = "Run project scripts, together and on file changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WYP_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a script by name; lists the scripts when no name is given.
    Run {
        name: Option<String>,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Run the start script (configured or detected).
    Start {
        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Run several scripts together.
    Combine {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Send SIGTERM to a process.
    Kill { pid: i32 },

    /// Create a new config file.
    Init,

    /// List the available scripts.
    List,

    /// Scripts marked `root = true` run as `wyp <name>`.
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Restart-on-change flags shared by the run-style commands.
#[derive(Debug, Clone, Default, Args)]
pub struct WatchArgs {
    /// Restart when files in the current directory change.
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Restart when files in DIR change.
    #[arg(short = 'W', long, value_name = "DIR")]
    pub watch_dir: Option<String>,
}

impl WatchArgs {
    /// Directory to watch, if any: the script's own `watch` setting wins,
    /// then `--watch-dir`, then `.` for a bare `--watch`.
    pub fn resolve(&self, script_watch: Option<&str>) -> Option<String> {
        let explicit = script_watch
            .filter(|s| !s.is_empty())
            .or(self.watch_dir.as_deref().filter(|s| !s.is_empty()));

        match explicit {
            Some(dir) => Some(dir.to_string()),
            None if self.watch => Some(".".to_string()),
            None => None,
        }
    }
}

/// Arguments after `wyp <name>` for root scripts.
#[derive(Debug, Clone, Parser)]
#[command(name = "wyp")]
pub struct RootScriptArgs {
    #[command(flatten)]
    pub watch: WatchArgs,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
