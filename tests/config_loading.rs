// tests/config_loading.rs

use std::path::Path;

use wyp::config::{START_SCRIPT, load_and_validate, write_scaffold};
use wyp::errors::WypError;
use wyp::fs::RealFileSystem;
use wyp::load_config;
use wyp::report::listing;
use wyp::script::{resolve, resolve_combine};
use wyp_test_utils::builders::{ConfigFileBuilder, ScriptConfigBuilder};

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

#[test]
fn loads_scripts_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wyp.toml");
    write(
        &path,
        r#"
[scripts.dev]
combine = ["api", "web"]
watch = "src"

[scripts.api]
run = "cargo run"
env = ["PORT=3000"]

[scripts.web]
run = "npm run dev"
name = "frontend"
"#,
    );

    let cfg = load_config(&RealFileSystem, &path).unwrap();
    assert_eq!(cfg.script("api").unwrap().name.as_deref(), Some("api"));
    assert_eq!(cfg.script("web").unwrap().name.as_deref(), Some("frontend"));

    let run = resolve(&cfg, "dev").unwrap();
    assert_eq!(run.watch.as_deref(), Some("src"));
    let names: Vec<_> = run.scripts.iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["api", "frontend"]);
}

#[test]
fn bad_combine_reference_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wyp.toml");
    write(
        &path,
        r#"
[scripts.dev]
combine = ["ghost"]
"#,
    );

    match load_and_validate(&RealFileSystem, &path) {
        Err(WypError::ConfigError(msg)) => assert!(msg.contains("ghost")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wyp.toml");
    write(&path, "[scripts.dev\nrun = 1");

    assert!(matches!(
        load_and_validate(&RealFileSystem, &path),
        Err(WypError::TomlError(_))
    ));
}

#[test]
fn detects_start_script_from_project_files() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("package.json"), "{}");
    write(&dir.path().join("Makefile"), "all:\n");
    let path = dir.path().join("wyp.toml");

    // No config file at all: detection still supplies `start`.
    let cfg = load_config(&RealFileSystem, &path).unwrap();
    let start = cfg.script(START_SCRIPT).unwrap();
    assert_eq!(start.run.as_deref(), Some("make"));
    assert_eq!(start.help.as_deref(), Some("make (detected)"));
}

#[test]
fn disabled_inspectors_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("package.json"), "{}");
    write(&dir.path().join("Makefile"), "all:\n");
    let path = dir.path().join("wyp.toml");
    write(&path, "[inspectors]\nmake = false\n");

    let cfg = load_config(&RealFileSystem, &path).unwrap();
    assert_eq!(
        cfg.script(START_SCRIPT).unwrap().run.as_deref(),
        Some("npm start")
    );
}

#[test]
fn configured_start_script_wins_over_detection() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("Makefile"), "all:\n");
    let path = dir.path().join("wyp.toml");
    write(&path, "[scripts.start]\nrun = \"./serve\"\n");

    let cfg = load_config(&RealFileSystem, &path).unwrap();
    assert_eq!(
        cfg.script(START_SCRIPT).unwrap().run.as_deref(),
        Some("./serve")
    );
}

#[test]
fn scaffold_is_a_valid_config_and_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wyp.toml");

    write_scaffold(&RealFileSystem, &path).unwrap();
    let cfg = load_and_validate(&RealFileSystem, &path).unwrap();
    let run = resolve(&cfg, START_SCRIPT).unwrap();
    let names: Vec<_> = run.scripts.iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["greet", "sleep"]);

    assert!(matches!(
        write_scaffold(&RealFileSystem, &path),
        Err(WypError::AlreadyConfigured(_))
    ));
}

#[test]
fn builder_configs_resolve_and_list() {
    let cfg = ConfigFileBuilder::new()
        .with_script("api", ScriptConfigBuilder::run("cargo run").prefix("server").build())
        .with_script("web", ScriptConfigBuilder::run("npm run dev").help("frontend").build())
        .with_script("tools", ScriptConfigBuilder::run("./tools").hide().build())
        .with_script("all", ScriptConfigBuilder::combine(&["api", "web"]).root().build())
        .build();

    let run = resolve_combine(&cfg, &["web".to_string(), "api".to_string()]).unwrap();
    assert_eq!(run.scripts[1].prefix(), "server");

    let text = listing(&cfg);
    assert!(text.contains("run in parallel api, web"));
    assert!(text.contains("frontend"));
    assert!(!text.contains("tools"));
}

#[test]
fn builder_rejects_self_combine() {
    let err = ConfigFileBuilder::new()
        .with_script("loop", ScriptConfigBuilder::combine(&["loop"]).build())
        .try_build()
        .unwrap_err();
    assert!(matches!(err, WypError::ConfigError(_)));
}
