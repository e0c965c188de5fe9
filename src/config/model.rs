// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::Inspector;

/// Top-level configuration as read from `wyp.toml`.
///
/// ```toml
/// [inspectors]
/// docker = false
///
/// [scripts.start]
/// combine = ["api", "web"]
///
/// [scripts.api]
/// run = "cargo run"
/// dir = "server"
/// env = ["RUST_LOG=debug"]
/// watch = "server/src"
///
/// [scripts.web]
/// run = "npm run dev"
/// prefix = "ui"
/// ```
///
/// This is the raw deserialized shape; use [`ConfigFile`] (obtained via
/// `TryFrom`) everywhere else so that validation has been applied.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Which start-script detectors are enabled, from `[inspectors]`.
    #[serde(default)]
    pub inspectors: InspectorsSection,

    /// All scripts from `[scripts.<name>]`, keyed by script name.
    #[serde(default)]
    pub scripts: BTreeMap<String, ScriptConfig>,
}

/// A validated configuration.
///
/// Constructed only through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// which also backfills each script's `name` from its table key.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub inspectors: InspectorsSection,
    pub scripts: BTreeMap<String, ScriptConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        inspectors: InspectorsSection,
        scripts: BTreeMap<String, ScriptConfig>,
    ) -> Self {
        Self {
            inspectors,
            scripts,
        }
    }

    pub fn script(&self, name: &str) -> Option<&ScriptConfig> {
        self.scripts.get(name)
    }

    /// Scripts that should appear in listings, in name order.
    pub fn visible_scripts(&self) -> impl Iterator<Item = (&String, &ScriptConfig)> {
        self.scripts.iter().filter(|(_, s)| !s.hide)
    }

    /// Scripts that are exposed as top-level `wyp <name>` commands.
    pub fn root_scripts(&self) -> impl Iterator<Item = &String> {
        self.scripts
            .iter()
            .filter(|(_, s)| s.root)
            .map(|(name, _)| name)
    }
}

/// `[inspectors]` section. Every inspector is enabled unless switched off.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InspectorsSection {
    #[serde(default = "enabled")]
    pub npm: bool,

    #[serde(default = "enabled")]
    pub docker: bool,

    #[serde(default = "enabled")]
    pub make: bool,
}

fn enabled() -> bool {
    true
}

impl Default for InspectorsSection {
    fn default() -> Self {
        Self {
            npm: true,
            docker: true,
            make: true,
        }
    }
}

impl InspectorsSection {
    pub fn is_enabled(&self, inspector: Inspector) -> bool {
        match inspector {
            Inspector::Npm => self.npm,
            Inspector::Docker => self.docker,
            Inspector::Make => self.make,
        }
    }
}

/// `[scripts.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScriptConfig {
    /// Shell command line, run as `<shell> -c <run>`.
    #[serde(default)]
    pub run: Option<String>,

    /// Names of scripts to run together instead of `run`.
    #[serde(default)]
    pub combine: Vec<String>,

    /// Working directory for the child.
    #[serde(default)]
    pub dir: Option<String>,

    /// `KEY=value` pairs appended to the inherited environment.
    #[serde(default)]
    pub env: Vec<String>,

    /// Interpreter override; falls back to `$SHELL`, then `bash`.
    #[serde(default)]
    pub shell: Option<String>,

    #[serde(default)]
    pub help: Option<String>,

    /// Omit from listings.
    #[serde(default)]
    pub hide: bool,

    /// Also expose as a top-level `wyp <name>` command.
    #[serde(default)]
    pub root: bool,

    /// Directory tree to watch; a change restarts the whole group.
    #[serde(default)]
    pub watch: Option<String>,

    /// Display label override for prefixed output.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Display name; backfilled from the table key when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl ScriptConfig {
    pub fn is_combine(&self) -> bool {
        !self.combine.is_empty()
    }

    /// Text shown next to the script in listings.
    pub fn help_text(&self) -> String {
        match (&self.help, self.is_combine()) {
            (Some(help), _) => help.clone(),
            (None, true) => format!("run in parallel {}", self.combine.join(", ")),
            (None, false) => self.run.clone().unwrap_or_default(),
        }
    }
}
