// src/config/detect.rs

//! Start-script detection from well-known project files.

use std::path::Path;

use tracing::{debug, info};

use crate::config::model::{ConfigFile, ScriptConfig};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::Inspector;

pub const START_SCRIPT: &str = "start";

/// Synthesise a `start` script from the first recognised project file in
/// `dir`, unless one is already configured.
///
/// Files are considered in sorted name order and only regular files count.
/// Returns the inspector that supplied the script, if any.
pub fn detect_start_script(
    fs: &dyn FileSystem,
    dir: &Path,
    cfg: &mut ConfigFile,
) -> Result<Option<Inspector>> {
    if cfg.scripts.contains_key(START_SCRIPT) || !fs.exists(dir) {
        return Ok(None);
    }

    let mut names: Vec<String> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|path| fs.is_file(path))
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();

    let found = names
        .iter()
        .filter_map(|name| Inspector::for_marker(name))
        .find(|inspector| cfg.inspectors.is_enabled(*inspector));

    let Some(inspector) = found else {
        debug!(?dir, "no start script detected");
        return Ok(None);
    };

    info!(%inspector, "detected start script");
    cfg.scripts.insert(
        START_SCRIPT.to_string(),
        ScriptConfig {
            name: Some(START_SCRIPT.to_string()),
            run: Some(inspector.start_command().to_string()),
            help: Some(format!("{} (detected)", inspector.start_command())),
            ..ScriptConfig::default()
        },
    );

    Ok(Some(inspector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawConfigFile;
    use crate::fs::mock::MockFileSystem;

    fn empty_config() -> ConfigFile {
        ConfigFile::try_from(RawConfigFile::default()).unwrap()
    }

    #[test]
    fn makefile_wins_over_package_json() {
        let fs = MockFileSystem::new();
        fs.add_file("proj/package.json", "{}");
        fs.add_file("proj/Makefile", "all:");

        let mut cfg = empty_config();
        let found = detect_start_script(&fs, Path::new("proj"), &mut cfg).unwrap();

        assert_eq!(found, Some(Inspector::Make));
        assert_eq!(cfg.scripts[START_SCRIPT].run.as_deref(), Some("make"));
        assert_eq!(
            cfg.scripts[START_SCRIPT].help.as_deref(),
            Some("make (detected)")
        );
    }

    #[test]
    fn disabled_inspectors_are_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("proj/Makefile", "all:");
        fs.add_file("proj/docker-compose.yml", "services: {}");

        let mut cfg = empty_config();
        cfg.inspectors.make = false;
        let found = detect_start_script(&fs, Path::new("proj"), &mut cfg).unwrap();

        assert_eq!(found, Some(Inspector::Docker));
        assert_eq!(
            cfg.scripts[START_SCRIPT].run.as_deref(),
            Some("docker-compose up")
        );
    }

    #[test]
    fn configured_start_is_kept() {
        let fs = MockFileSystem::new();
        fs.add_file("proj/package.json", "{}");

        let mut cfg = empty_config();
        cfg.scripts.insert(
            START_SCRIPT.to_string(),
            ScriptConfig {
                run: Some("./serve".to_string()),
                ..ScriptConfig::default()
            },
        );

        assert_eq!(detect_start_script(&fs, Path::new("proj"), &mut cfg).unwrap(), None);
        assert_eq!(cfg.scripts[START_SCRIPT].run.as_deref(), Some("./serve"));
    }

    #[test]
    fn directories_named_like_markers_are_ignored() {
        let fs = MockFileSystem::new();
        fs.add_file("proj/Makefile/inner.txt", "not a makefile");

        let mut cfg = empty_config();
        assert_eq!(detect_start_script(&fs, Path::new("proj"), &mut cfg).unwrap(), None);
        assert!(!cfg.scripts.contains_key(START_SCRIPT));
    }

    #[test]
    fn missing_directory_detects_nothing() {
        let fs = MockFileSystem::new();
        let mut cfg = empty_config();
        assert_eq!(detect_start_script(&fs, Path::new("gone"), &mut cfg).unwrap(), None);
    }
}
