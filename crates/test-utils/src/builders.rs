#![allow(dead_code)]

use wyp::config::{ConfigFile, InspectorsSection, RawConfigFile, ScriptConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_script(mut self, name: &str, script: ScriptConfig) -> Self {
        self.config.scripts.insert(name.to_string(), script);
        self
    }

    pub fn with_inspectors(mut self, inspectors: InspectorsSection) -> Self {
        self.config.inspectors = inspectors;
        self
    }

    /// Validate; panics on an invalid config.
    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    pub fn try_build(self) -> wyp::errors::Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ScriptConfig`.
pub struct ScriptConfigBuilder {
    script: ScriptConfig,
}

impl ScriptConfigBuilder {
    pub fn run(cmd: &str) -> Self {
        Self {
            script: ScriptConfig {
                run: Some(cmd.to_string()),
                ..ScriptConfig::default()
            },
        }
    }

    pub fn combine(names: &[&str]) -> Self {
        Self {
            script: ScriptConfig {
                combine: names.iter().map(|n| n.to_string()).collect(),
                ..ScriptConfig::default()
            },
        }
    }

    pub fn dir(mut self, dir: &str) -> Self {
        self.script.dir = Some(dir.to_string());
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.script.env.push(entry.to_string());
        self
    }

    pub fn shell(mut self, shell: &str) -> Self {
        self.script.shell = Some(shell.to_string());
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.script.help = Some(help.to_string());
        self
    }

    pub fn hide(mut self) -> Self {
        self.script.hide = true;
        self
    }

    pub fn root(mut self) -> Self {
        self.script.root = true;
        self
    }

    pub fn watch(mut self, dir: &str) -> Self {
        self.script.watch = Some(dir.to_string());
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.script.prefix = Some(prefix.to_string());
        self
    }

    pub fn build(self) -> ScriptConfig {
        self.script
    }
}
