//! Purpose: The curated plugin bundle manifest and copy semantics.
//! Exports: `PLUGIN_NAME`, `Bundle`, `CopyReport`, `SkippedEntry`.
//! Invariants: Only manifest entries are ever copied; layout is preserved.
//! Invariants: `metadata.txt` and `__init__.py` are required; the rest are
//! optional and skipped with a notice when absent.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{Error, ErrorKind, io_error};

pub const PLUGIN_NAME: &str = "timelapse";

/// Distributable file set, relative to the bundle root.
pub const BUNDLE_FILES: &[&str] = &[
    "__init__.py",
    "metadata.txt",
    "timelapse_plugin.py",
    "timelapse_dialog.py",
    "timelapse_core.py",
    "resources.qrc",
    "requirements.txt",
];

pub const BUNDLE_DIRS: &[&str] = &["icons"];

/// Entries that must be present for the source to count as a plugin bundle.
const REQUIRED_FILES: &[&str] = &["__init__.py", "metadata.txt"];

#[derive(Clone, Debug)]
pub struct Bundle {
    root: PathBuf,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedEntry {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: u64,
    pub skipped: Vec<SkippedEntry>,
}

impl Bundle {
    /// Validate `root` as a plugin bundle source. Fails without touching the
    /// target when the root or a required file is missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::new(ErrorKind::NotFound)
                .with_message("plugin bundle source not found")
                .with_path(&root)
                .with_hint("Run from the plugin source directory or pass --source."));
        }
        for name in REQUIRED_FILES {
            let path = root.join(name);
            if !path.is_file() {
                return Err(Error::new(ErrorKind::NotFound)
                    .with_message(format!("plugin bundle is missing {name}"))
                    .with_path(&root)
                    .with_hint("Pass --source pointing at the directory that holds metadata.txt."));
            }
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join("metadata.txt")
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.root.join("requirements.txt")
    }

    /// Copy the manifest into `dest`, creating it. Optional entries missing
    /// from the source are recorded, not fatal.
    pub fn copy_into(&self, dest: &Path) -> Result<CopyReport, Error> {
        fs::create_dir_all(dest)
            .map_err(|err| io_error(err, "failed to create plugin directory", dest))?;

        let mut report = CopyReport::default();
        for name in BUNDLE_FILES {
            let source = self.root.join(name);
            if !source.is_file() {
                report.skipped.push(SkippedEntry {
                    name: (*name).to_string(),
                });
                continue;
            }
            let target = dest.join(name);
            fs::copy(&source, &target)
                .map_err(|err| io_error(err, "failed to copy bundle file", &source))?;
            debug!(file = *name, "copied bundle file");
            report.copied += 1;
        }

        for name in BUNDLE_DIRS {
            let source = self.root.join(name);
            if !source.is_dir() {
                report.skipped.push(SkippedEntry {
                    name: format!("{name}/"),
                });
                continue;
            }
            copy_dir_all(&source, &dest.join(name))?;
            debug!(dir = *name, "copied bundle directory");
            report.copied += 1;
        }
        Ok(report)
    }
}

fn copy_dir_all(source: &Path, dest: &Path) -> Result<(), Error> {
    fs::create_dir_all(dest)
        .map_err(|err| io_error(err, "failed to create directory", dest))?;
    let entries = fs::read_dir(source)
        .map_err(|err| io_error(err, "failed to read directory", source))?;
    for entry in entries {
        let entry = entry.map_err(|err| io_error(err, "failed to read directory", source))?;
        let file_type = entry
            .file_type()
            .map_err(|err| io_error(err, "failed to stat entry", &entry.path()))?;
        let target = dest.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .map_err(|err| io_error(err, "failed to copy file", &entry.path()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{Bundle, PLUGIN_NAME};
    use crate::core::error::ErrorKind;

    #[test]
    fn plugin_name_is_the_archive_root() {
        assert_eq!(PLUGIN_NAME, "timelapse");
    }

    #[test]
    fn open_rejects_missing_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = Bundle::open(temp.path().join("nope")).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn open_rejects_directory_without_metadata() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("__init__.py"), "").expect("write");
        let err = Bundle::open(temp.path()).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn copy_preserves_layout_and_reports_skips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("plugin");
        fs::create_dir_all(source.join("icons")).expect("mkdir");
        fs::write(source.join("__init__.py"), "# init").expect("write");
        fs::write(source.join("metadata.txt"), "version=0.1.0\n").expect("write");
        fs::write(source.join("icons/icon.svg"), "<svg/>").expect("write");

        let dest = temp.path().join("out");
        let report = Bundle::open(&source)
            .expect("open")
            .copy_into(&dest)
            .expect("copy");

        assert!(dest.join("__init__.py").is_file());
        assert!(dest.join("metadata.txt").is_file());
        assert!(dest.join("icons/icon.svg").is_file());
        // 2 files + icons/
        assert_eq!(report.copied, 3);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.name.as_str()).collect();
        assert!(skipped.contains(&"timelapse_core.py"));
        assert!(!skipped.contains(&"icons/"));
    }
}
