// src/script.rs

//! The runnable-unit abstraction the supervisor works with.
//!
//! The process group never sees the configuration schema: it is handed
//! `Arc<dyn Script>` values. [`ScriptSpec`] is the adapter that resolves a
//! configured script (plus its `combine` set) into that form.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::config::{ConfigFile, ScriptConfig};
use crate::errors::{Result, WypError};
use crate::output::palette;

/// Capabilities a child process is built from.
pub trait Script: Send + Sync + std::fmt::Debug {
    /// Working directory; empty means inherit.
    fn dir(&self) -> &str;
    /// `KEY=value` pairs appended to the inherited environment.
    fn env(&self) -> &[String];
    fn name(&self) -> &str;
    /// Command line handed to `<shell> -c`.
    fn run(&self) -> &str;
    /// Interpreter override; empty means fall back.
    fn shell(&self) -> &str;
    /// Display label override; empty means use `name`.
    fn prefix(&self) -> &str;
}

/// Immutable, resolved description of one runnable script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSpec {
    pub name: String,
    pub run: String,
    pub dir: String,
    pub env: Vec<String>,
    pub shell: String,
    pub prefix: String,
}

impl ScriptSpec {
    pub fn new(name: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run: run.into(),
            ..Self::default()
        }
    }

    pub fn from_config(key: &str, cfg: &ScriptConfig) -> Self {
        Self {
            name: cfg.name.clone().unwrap_or_else(|| key.to_string()),
            run: cfg.run.clone().unwrap_or_default(),
            dir: cfg.dir.clone().unwrap_or_default(),
            env: cfg.env.clone(),
            shell: cfg.shell.clone().unwrap_or_default(),
            prefix: cfg.prefix.clone().unwrap_or_default(),
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_env(mut self, entry: impl Into<String>) -> Self {
        self.env.push(entry.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Script for ScriptSpec {
    fn dir(&self) -> &str {
        &self.dir
    }

    fn env(&self) -> &[String] {
        &self.env
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> &str {
        &self.run
    }

    fn shell(&self) -> &str {
        &self.shell
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// An entry script together with the sub-scripts a run of it starts.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    /// Label used in `[wyp]` status lines.
    pub label: String,
    /// `watch` override of the entry script, if any.
    pub watch: Option<String>,
    pub scripts: Vec<Arc<dyn Script>>,
}

/// Resolve a configured script into the list of scripts to start.
///
/// A plain script resolves to itself; a combine script resolves to each of
/// its members in listed order.
pub fn resolve(cfg: &ConfigFile, name: &str) -> Result<ResolvedRun> {
    let entry = cfg
        .script(name)
        .ok_or_else(|| WypError::ScriptNotFound(name.to_string()))?;

    let scripts = if entry.is_combine() {
        resolve_members(cfg, &entry.combine)?
    } else {
        vec![Arc::new(ScriptSpec::from_config(name, entry)) as Arc<dyn Script>]
    };

    Ok(ResolvedRun {
        label: name.to_string(),
        watch: entry.watch.clone().filter(|w| !w.is_empty()),
        scripts,
    })
}

/// Resolve an ad-hoc set of script names (the `combine` command).
///
/// The label lists the names, each in the colour its runner will use.
pub fn resolve_combine(cfg: &ConfigFile, names: &[String]) -> Result<ResolvedRun> {
    let scripts = resolve_members(cfg, names)?;

    let coloured: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| name.color(palette::color_for(i)).to_string())
        .collect();

    Ok(ResolvedRun {
        label: format!("[{}]", coloured.join(", ")),
        watch: None,
        scripts,
    })
}

fn resolve_members(cfg: &ConfigFile, names: &[String]) -> Result<Vec<Arc<dyn Script>>> {
    names
        .iter()
        .map(|member| {
            let member_cfg = cfg
                .script(member)
                .ok_or_else(|| WypError::ScriptNotFound(member.clone()))?;
            if member_cfg.is_combine() {
                return Err(WypError::ConfigError(format!(
                    "'{}' is a combine script and cannot be combined again",
                    member
                )));
            }
            Ok(Arc::new(ScriptSpec::from_config(member, member_cfg)) as Arc<dyn Script>)
        })
        .collect()
}
