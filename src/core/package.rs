//! Purpose: Assemble the distributable archive from a staged bundle copy.
//! Exports: `PackageConfig`, `PackageReport`, `package`.
//! Role: Orchestrates metadata read, staging, stripping, and zip assembly.
//! Invariants: The archive's single top-level entry is `timelapse/`.
//! Invariants: Staging lives in a `TempDir` and is destroyed on every path.
//! Invariants: An existing archive of the same name is replaced atomically.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::artifacts::strip_artifacts;
use super::bundle::{Bundle, PLUGIN_NAME};
use super::error::{Error, ErrorKind, io_error};
use super::metadata::read_version;

#[derive(Clone, Debug)]
pub struct PackageConfig {
    pub source: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug)]
pub struct PackageReport {
    pub version: String,
    pub archive: PathBuf,
    pub files_packaged: u64,
    pub artifacts_stripped: u64,
}

pub fn package(config: &PackageConfig) -> Result<PackageReport, Error> {
    let bundle = Bundle::open(&config.source)?;
    let version = read_version(&bundle.metadata_path())?;

    fs::create_dir_all(&config.output_dir).map_err(|err| {
        io_error(err, "failed to create output directory", &config.output_dir)
    })?;

    // TempDir drop cleans staging up even when archiving fails.
    let staging = tempfile::tempdir().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to create staging directory")
            .with_source(err)
    })?;
    let stage_root = staging.path().join(PLUGIN_NAME);
    bundle.copy_into(&stage_root)?;
    let artifacts_stripped = strip_artifacts(&stage_root)?;
    debug!(path = %stage_root.display(), "staged bundle");

    let archive_name = format!("{PLUGIN_NAME}-{version}.zip");
    let archive = config.output_dir.join(&archive_name);
    let partial = config.output_dir.join(format!("{archive_name}.part"));

    let files_packaged = match write_zip(staging.path(), &stage_root, &partial) {
        Ok(count) => count,
        Err(err) => {
            let _ = fs::remove_file(&partial);
            return Err(err);
        }
    };

    // Replace any previous archive of the same version in one step.
    if archive.exists() {
        fs::remove_file(&archive)
            .map_err(|err| io_error(err, "failed to replace previous archive", &archive))?;
    }
    fs::rename(&partial, &archive)
        .map_err(|err| io_error(err, "failed to move archive into place", &archive))?;
    debug!(path = %archive.display(), files = files_packaged, "wrote archive");

    Ok(PackageReport {
        version,
        archive,
        files_packaged,
        artifacts_stripped,
    })
}

/// Zip everything under `stage_root`, with entry names relative to
/// `staging_root` so the archive root is the plugin name directory.
fn write_zip(staging_root: &Path, stage_root: &Path, out: &Path) -> Result<u64, Error> {
    let file = File::create(out)
        .map_err(|err| io_error(err, "failed to create archive", out))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let zip_err = |err: zip::result::ZipError, path: &Path| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write archive entry")
            .with_path(path)
            .with_source(err)
    };

    let mut files = 0u64;
    for entry in WalkDir::new(stage_root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to walk staging tree")
                .with_path(stage_root)
                .with_source(err)
        })?;
        let path = entry.path();
        let relative = path
            .strip_prefix(staging_root)
            .map_err(|_| {
                Error::new(ErrorKind::Internal)
                    .with_message("staging entry escaped the staging root")
                    .with_path(path)
            })?
            .to_string_lossy()
            .replace('\\', "/");

        if entry.file_type().is_dir() {
            writer
                .add_directory(format!("{relative}/"), options)
                .map_err(|err| zip_err(err, path))?;
        } else {
            writer
                .start_file(relative, options)
                .map_err(|err| zip_err(err, path))?;
            let mut source = File::open(path)
                .map_err(|err| io_error(err, "failed to read staged file", path))?;
            io::copy(&mut source, &mut writer)
                .map_err(|err| io_error(err, "failed to compress staged file", path))?;
            files += 1;
        }
    }

    writer
        .finish()
        .map_err(|err| zip_err(err, out))?
        .into_inner()
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to flush archive")
                .with_path(out)
                .with_source(err.into_error())
        })?;
    Ok(files)
}
