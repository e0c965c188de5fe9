// src/config/scaffold.rs

use std::path::Path;

use tracing::info;

use crate::errors::{Result, WypError};
use crate::fs::FileSystem;

/// Starter configuration written by `wyp init`.
pub const SCAFFOLD: &str = r#"[scripts.start]
combine = ["greet", "sleep"]

[scripts.greet]
help = "say a greeting"
run = "echo Hello World!"

[scripts.sleep]
help = "catch some z's"
run = "while true; do echo \"zzz\"; sleep 1; done"
"#;

/// Write [`SCAFFOLD`] to `path`, refusing to overwrite an existing config.
pub fn write_scaffold(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if fs.exists(path) {
        return Err(WypError::AlreadyConfigured(path.to_path_buf()));
    }

    fs.write(path, SCAFFOLD.as_bytes())?;
    info!(?path, "wrote scaffold config");
    Ok(())
}
