// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod output;
pub mod report;
pub mod script;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command, RootScriptArgs, WatchArgs};
use crate::config::{
    ConfigFile, START_SCRIPT, detect_start_script, load_and_validate, write_scaffold,
};
use crate::errors::{Result, WypError};
use crate::exec::{ProcessGroup, kill_pid};
use crate::fs::{FileSystem, RealFileSystem};
use crate::script::{ResolvedRun, resolve, resolve_combine};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and start-script detection
/// - script resolution
/// - the process group
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;

    match args.command {
        Command::Init => {
            write_scaffold(&fs, &args.config)?;
            report::announce(format!("Generated scripts file at {}", args.config.display()));
            return Ok(());
        }
        Command::Kill { pid } => {
            report::announce(format!("Killing process {pid}"));
            return kill_pid(pid);
        }
        _ => {}
    }

    let cfg = load_config(&fs, &args.config)?;

    match args.command {
        Command::List | Command::Run { name: None, .. } => {
            print!("{}", report::listing(&cfg));
            Ok(())
        }
        Command::Run {
            name: Some(name),
            watch,
        } => run_resolved(resolve(&cfg, &name)?, &watch).await,
        Command::Start { watch } => {
            if cfg.script(START_SCRIPT).is_none() {
                return Err(WypError::NoStartScript);
            }
            run_resolved(resolve(&cfg, START_SCRIPT)?, &watch).await
        }
        Command::Combine { names, watch } => {
            run_resolved(resolve_combine(&cfg, &names)?, &watch).await
        }
        Command::External(argv) => {
            let Some(name) = argv.first() else {
                return Err(WypError::ScriptNotFound(String::new()));
            };
            if !cfg.script(name).is_some_and(|s| s.root) {
                return Err(WypError::ScriptNotFound(name.clone()));
            }
            let extra = RootScriptArgs::try_parse_from(&argv)
                .map_err(|e| WypError::ConfigError(e.to_string()))?;
            run_resolved(resolve(&cfg, name)?, &extra.watch).await
        }
        Command::Init | Command::Kill { .. } => Ok(()),
    }
}

/// Load the config file and add a detected `start` script if none is set.
pub fn load_config(fs: &dyn FileSystem, config_path: &Path) -> Result<ConfigFile> {
    let mut cfg = load_and_validate(fs, config_path)?;
    let root = config_root_dir(config_path);
    if let Some(inspector) = detect_start_script(fs, &root, &mut cfg)? {
        debug!(%inspector, "using detected start script");
    }
    Ok(cfg)
}

/// Run `resolved` until every script has exited, restarting on file
/// changes when a watch directory applies. Ctrl-C stops the run.
pub async fn run_resolved(resolved: ResolvedRun, watch_args: &WatchArgs) -> Result<()> {
    let started = Instant::now();
    report::announce(report::running_line(&resolved.label, &Local::now()));

    let group = Arc::new(ProcessGroup::new(resolved.scripts, CancellationToken::new())?);

    // Ctrl-C → kill every child.
    {
        let cancel = group.cancellation_token().clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    group.start();

    let mut watcher = match watch_args.resolve(resolved.watch.as_deref()) {
        Some(dir) => {
            report::announce(report::watching_line(&dir));
            let restart_group = Arc::clone(&group);
            let handle = watch::watch(&dir, move |kind, path| {
                report::announce(report::restarting_line(&path, kind));
                restart_group.restart();
            });
            match handle {
                Ok(handle) => Some(handle),
                Err(err) => {
                    group.shutdown();
                    return Err(err);
                }
            }
        }
        None => None,
    };

    let outcome = match watcher.as_mut() {
        Some(handle) => tokio::select! {
            res = group.wait() => res,
            err = handle.failed() => Err(err),
        },
        None => group.wait().await,
    };
    drop(watcher);

    if let Err(err) = outcome {
        group.shutdown();
        return Err(err);
    }

    if group.cancellation_token().is_cancelled() {
        report::announce(report::stopped_line(&resolved.label));
    } else {
        info!(generations = group.generation(), "run completed");
        report::announce(report::completed_line(
            &resolved.label,
            &Local::now(),
            started.elapsed(),
        ));
    }

    Ok(())
}

/// Directory used for start-script detection.
///
/// - If the config path has a non-empty parent (e.g. "configs/wyp.toml"),
///   we use that directory.
/// - If it's just a bare filename like "wyp.toml" (parent = ""),
///   we fall back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
