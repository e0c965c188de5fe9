// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WypError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WypError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let mut scripts = raw.scripts;
        for (key, script) in scripts.iter_mut() {
            if script.name.as_deref().is_none_or(str::is_empty) {
                script.name = Some(key.clone());
            }
        }

        Ok(ConfigFile::new_unchecked(raw.inspectors, scripts))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_script_bodies(cfg)?;
    validate_combine_references(cfg)?;
    validate_env_entries(cfg)?;
    Ok(())
}

fn validate_script_bodies(cfg: &RawConfigFile) -> Result<()> {
    for (name, script) in cfg.scripts.iter() {
        if script.run.is_none() && script.combine.is_empty() {
            return Err(WypError::ConfigError(format!(
                "script '{}' needs either `run` or `combine`",
                name
            )));
        }
    }
    Ok(())
}

fn validate_combine_references(cfg: &RawConfigFile) -> Result<()> {
    for (name, script) in cfg.scripts.iter() {
        for member in script.combine.iter() {
            if member == name {
                return Err(WypError::ConfigError(format!(
                    "script '{}' cannot combine itself",
                    name
                )));
            }

            let Some(target) = cfg.scripts.get(member) else {
                return Err(WypError::ConfigError(format!(
                    "script '{}' has unknown script '{}' in `combine`",
                    name, member
                )));
            };

            if target.is_combine() {
                return Err(WypError::ConfigError(format!(
                    "script '{}' combines '{}', which is itself a combine script",
                    name, member
                )));
            }
        }
    }
    Ok(())
}

fn validate_env_entries(cfg: &RawConfigFile) -> Result<()> {
    for (name, script) in cfg.scripts.iter() {
        for entry in script.env.iter() {
            match entry.split_once('=') {
                Some((key, _)) if !key.is_empty() => {}
                _ => {
                    return Err(WypError::ConfigError(format!(
                        "script '{}' has malformed env entry '{}' (expected KEY=value)",
                        name, entry
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(raw)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn backfills_names_from_keys() {
        let cfg = parse(
            r#"
[scripts.greet]
run = "echo hi"

[scripts.named]
run = "echo hi"
name = "custom"
"#,
        )
        .unwrap();

        assert_eq!(cfg.scripts["greet"].name.as_deref(), Some("greet"));
        assert_eq!(cfg.scripts["named"].name.as_deref(), Some("custom"));
    }

    #[test]
    fn rejects_unknown_combine_member() {
        let err = parse(
            r#"
[scripts.start]
combine = ["missing"]
"#,
        )
        .unwrap_err();

        match err {
            WypError::ConfigError(msg) => assert!(msg.contains("unknown script 'missing'")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_nested_combine() {
        let err = parse(
            r#"
[scripts.a]
run = "echo a"

[scripts.inner]
combine = ["a"]

[scripts.outer]
combine = ["inner"]
"#,
        )
        .unwrap_err();

        assert!(matches!(err, WypError::ConfigError(msg) if msg.contains("itself a combine")));
    }

    #[test]
    fn rejects_self_combine_and_empty_scripts() {
        assert!(parse("[scripts.a]\ncombine = [\"a\"]\n").is_err());
        assert!(parse("[scripts.a]\nhelp = \"nothing to run\"\n").is_err());
    }

    #[test]
    fn rejects_env_entries_without_key() {
        assert!(parse("[scripts.a]\nrun = \"env\"\nenv = [\"NOEQUALS\"]\n").is_err());
        assert!(parse("[scripts.a]\nrun = \"env\"\nenv = [\"=value\"]\n").is_err());
        assert!(parse("[scripts.a]\nrun = \"env\"\nenv = [\"EMPTY=\"]\n").is_ok());
    }
}
