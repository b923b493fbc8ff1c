//! Purpose: Install and uninstall the plugin bundle under a plugins directory.
//! Exports: `install`, `uninstall`, `install_dependencies`, report types.
//! Invariants: Install is a clean replace of `{plugins}/timelapse`, never a merge.
//! Invariants: Uninstalling an absent target is a soft outcome, not an error.
//! Invariants: Dependency installation failures never fail the install.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::artifacts::{count_files, strip_artifacts};
use super::bundle::{Bundle, PLUGIN_NAME, SkippedEntry};
use super::error::{Error, ErrorKind, io_error};

#[derive(Debug)]
pub struct InstallReport {
    pub target: PathBuf,
    pub files_installed: u64,
    pub artifacts_stripped: u64,
    pub replaced_existing: bool,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Eq, PartialEq)]
pub enum UninstallOutcome {
    Removed(PathBuf),
    NotInstalled(PathBuf),
}

/// Clean-replace install of `bundle` into `{plugins_dir}/timelapse`, then
/// strip build artifacts from the copied tree.
pub fn install(bundle: &Bundle, plugins_dir: &Path) -> Result<InstallReport, Error> {
    fs::create_dir_all(plugins_dir)
        .map_err(|err| io_error(err, "failed to create plugins directory", plugins_dir))?;

    let target = plugins_dir.join(PLUGIN_NAME);
    let replaced_existing = target.exists();
    if replaced_existing {
        debug!(path = %target.display(), "removing previous installation");
        fs::remove_dir_all(&target)
            .map_err(|err| io_error(err, "failed to remove previous installation", &target))?;
    }

    let copy = bundle.copy_into(&target)?;
    let artifacts_stripped = strip_artifacts(&target)?;
    let files_installed = count_files(&target)?;

    Ok(InstallReport {
        target,
        files_installed,
        artifacts_stripped,
        replaced_existing,
        skipped: copy.skipped,
    })
}

pub fn uninstall(plugins_dir: &Path) -> Result<UninstallOutcome, Error> {
    let target = plugins_dir.join(PLUGIN_NAME);
    if !target.exists() {
        return Ok(UninstallOutcome::NotInstalled(target));
    }
    fs::remove_dir_all(&target)
        .map_err(|err| io_error(err, "failed to remove installed plugin", &target))?;
    Ok(UninstallOutcome::Removed(target))
}

/// Best-effort `pip install -r requirements.txt` with the first interpreter
/// that spawns. The caller downgrades any error here to a notice.
pub fn install_dependencies(bundle: &Bundle) -> Result<(), Error> {
    let requirements = bundle.requirements_path();
    if !requirements.is_file() {
        return Err(Error::new(ErrorKind::NotFound)
            .with_message("requirements.txt not found, skipping dependency installation")
            .with_path(&requirements));
    }

    let mut last_spawn_err = None;
    for interpreter in ["python3", "python"] {
        let result = Command::new(interpreter)
            .args(["-m", "pip", "install", "-r"])
            .arg(&requirements)
            .output();
        match result {
            Ok(output) if output.status.success() => {
                debug!(interpreter, "pip install succeeded");
                return Ok(());
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Error::new(ErrorKind::Internal)
                    .with_message(format!(
                        "pip install failed: {}",
                        stderr.lines().last().unwrap_or("unknown error")
                    ))
                    .with_hint("Install manually: pip install earthengine-api Pillow"));
            }
            Err(err) => last_spawn_err = Some(err),
        }
    }

    let mut error = Error::new(ErrorKind::NotFound)
        .with_message("no python interpreter found on PATH")
        .with_hint("Install manually: pip install earthengine-api Pillow");
    if let Some(err) = last_spawn_err {
        error = error.with_source(err);
    }
    Err(error)
}
