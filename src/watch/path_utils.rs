// src/watch/path_utils.rs

//! Path helpers for reporting changed files.

use std::path::Path;

/// Render `path` relative to `base`, with forward slashes.
///
/// - First try a direct `strip_prefix(base)`.
/// - If that fails (symlinked temp dirs, `/private/var` on macOS), strip the
///   canonicalized forms instead.
///
/// Returns `None` if `path` is not under `base`.
pub fn relative_str(base: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(base) {
        return Some(normalize(rel));
    }

    let base_canon = base.canonicalize().ok()?;
    if let Ok(rel) = path.strip_prefix(&base_canon) {
        return Some(normalize(rel));
    }

    // A removed file cannot be canonicalized; its parent usually can.
    let path_canon = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };
    path_canon.strip_prefix(&base_canon).ok().map(normalize)
}

/// What to show for a changed path: relative to `base` when possible,
/// otherwise the path as given.
pub fn display_path(base: &Path, path: &Path) -> String {
    relative_str(base, path).unwrap_or_else(|| path.display().to_string())
}

fn normalize(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn strips_base_prefix() {
        let base = Path::new("/work/project");
        assert_eq!(
            relative_str(base, Path::new("/work/project/src/main.rs")).as_deref(),
            Some("src/main.rs")
        );
    }

    #[test]
    fn unrelated_paths_fall_back_to_full_display() {
        let base = Path::new("/work/project-that-does-not-exist");
        let path = PathBuf::from("/elsewhere/file.txt");
        assert_eq!(relative_str(base, &path), None);
        assert_eq!(display_path(base, &path), "/elsewhere/file.txt");
    }

    #[test]
    fn resolves_removed_files_through_parent() {
        let dir = tempfile::tempdir().unwrap();
        let canon = dir.path().canonicalize().unwrap();
        let gone = canon.join("deleted.txt");
        assert_eq!(relative_str(dir.path(), &gone).as_deref(), Some("deleted.txt"));
    }
}
