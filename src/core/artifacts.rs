//! Purpose: Strip build artifacts from an installed or staged plugin tree.
//! Exports: `strip_artifacts`, `count_files`.
//! Invariants: Stripping matches names and extensions only, never content.

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use super::error::{Error, ErrorKind, io_error};

/// Directories pruned wholesale wherever they appear.
const STRIP_DIRS: &[&str] = &["__pycache__", ".git"];

/// Compiled-file extensions left behind by the Python toolchain.
const STRIP_EXTENSIONS: &[&str] = &["pyc", "pyo"];

/// OS metadata droppings.
const STRIP_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

fn is_strip_dir(name: &str) -> bool {
    STRIP_DIRS.contains(&name)
}

fn is_strip_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str())
        && STRIP_FILES.contains(&name)
    {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| STRIP_EXTENSIONS.contains(&ext))
}

/// Remove artifact files and directories anywhere under `root`. Returns the
/// number of top-most entries removed (a pruned directory counts once).
pub fn strip_artifacts(root: &Path) -> Result<u64, Error> {
    let mut doomed_dirs = Vec::new();
    let mut doomed_files = Vec::new();

    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to walk tree")
                .with_path(root)
                .with_source(err)
        })?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && is_strip_dir(name)
            {
                doomed_dirs.push(path.to_path_buf());
                walker.skip_current_dir();
            }
        } else if is_strip_file(path) {
            doomed_files.push(path.to_path_buf());
        }
    }

    let mut removed = 0u64;
    for dir in doomed_dirs {
        fs::remove_dir_all(&dir)
            .map_err(|err| io_error(err, "failed to remove artifact directory", &dir))?;
        debug!(path = %dir.display(), "stripped artifact directory");
        removed += 1;
    }
    for file in doomed_files {
        fs::remove_file(&file)
            .map_err(|err| io_error(err, "failed to remove artifact file", &file))?;
        debug!(path = %file.display(), "stripped artifact file");
        removed += 1;
    }
    Ok(removed)
}

/// Count regular files under `root`.
pub fn count_files(root: &Path) -> Result<u64, Error> {
    let mut count = 0u64;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to walk tree")
                .with_path(root)
                .with_source(err)
        })?;
        if entry.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{count_files, strip_artifacts};

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, b"x").expect("write");
    }

    #[test]
    fn strips_caches_compiled_files_and_os_droppings() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("timelapse_core.py"));
        touch(&root.join("module.pyc"));
        touch(&root.join("module.pyo"));
        touch(&root.join(".DS_Store"));
        touch(&root.join("icons/Thumbs.db"));
        touch(&root.join("icons/icon.svg"));
        touch(&root.join("__pycache__/timelapse_core.cpython-312.pyc"));
        touch(&root.join(".git/HEAD"));

        let removed = strip_artifacts(root).expect("strip");
        // __pycache__ and .git count once each
        assert_eq!(removed, 6);

        assert!(root.join("timelapse_core.py").is_file());
        assert!(root.join("icons/icon.svg").is_file());
        assert!(!root.join("module.pyc").exists());
        assert!(!root.join("module.pyo").exists());
        assert!(!root.join(".DS_Store").exists());
        assert!(!root.join("icons/Thumbs.db").exists());
        assert!(!root.join("__pycache__").exists());
        assert!(!root.join(".git").exists());
    }

    #[test]
    fn strip_is_a_no_op_on_a_clean_tree() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("metadata.txt"));
        assert_eq!(strip_artifacts(temp.path()).expect("strip"), 0);
        assert_eq!(count_files(temp.path()).expect("count"), 1);
    }

    #[test]
    fn count_ignores_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("a/b/c.txt"));
        touch(&temp.path().join("a/d.txt"));
        assert_eq!(count_files(temp.path()).expect("count"), 2);
    }
}
