//! Purpose: Resolve the QGIS plugins directory for an OS family and profile.
//! Exports: `HostOs`, `candidate_plugin_roots`, `resolve_plugins_dir`.
//! Role: Keep CLI path semantics testable; existence probing is injected.
//! Invariants: Resolution is pure over {os, home, appdata, profile, probe}.
//! Invariants: First existing candidate wins; the standard path is the fallback.

use std::path::{Path, PathBuf};

use super::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostOs {
    Linux,
    MacOs,
    Windows,
    Other(String),
}

impl HostOs {
    pub fn detect() -> Self {
        Self::from_identifier(std::env::consts::OS)
    }

    pub fn from_identifier(id: &str) -> Self {
        match id {
            "linux" => HostOs::Linux,
            "macos" => HostOs::MacOs,
            "windows" => HostOs::Windows,
            other => HostOs::Other(other.to_string()),
        }
    }
}

/// Inputs for path resolution, gathered once from the environment.
#[derive(Clone, Debug)]
pub struct HostEnv {
    pub os: HostOs,
    pub home: PathBuf,
    /// `%APPDATA%` on Windows; ignored elsewhere.
    pub appdata: Option<PathBuf>,
}

impl HostEnv {
    pub fn detect() -> Result<Self, Error> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .ok_or_else(|| {
                Error::new(ErrorKind::Internal)
                    .with_message("cannot determine the user home directory")
            })?;
        Ok(Self {
            os: HostOs::detect(),
            home,
            appdata: std::env::var_os("APPDATA").map(PathBuf::from),
        })
    }
}

fn profile_suffix(profile: &str) -> PathBuf {
    ["QGIS", "QGIS3", "profiles", profile, "python", "plugins"]
        .iter()
        .collect()
}

/// Candidate plugin roots in priority order. Linux lists the standard XDG
/// path first, then the Flatpak and Snap sandboxed layouts.
pub fn candidate_plugin_roots(env: &HostEnv, profile: &str) -> Result<Vec<PathBuf>, Error> {
    let suffix = profile_suffix(profile);
    let home = &env.home;
    match &env.os {
        HostOs::Linux => Ok(vec![
            home.join(".local").join("share").join(&suffix),
            home.join(".var")
                .join("app")
                .join("org.qgis.qgis")
                .join("data")
                .join(&suffix),
            home.join("snap")
                .join("qgis")
                .join("current")
                .join(".local")
                .join("share")
                .join(&suffix),
        ]),
        HostOs::MacOs => Ok(vec![
            home.join("Library").join("Application Support").join(&suffix),
        ]),
        HostOs::Windows => {
            let appdata = env
                .appdata
                .clone()
                .unwrap_or_else(|| home.join("AppData").join("Roaming"));
            Ok(vec![appdata.join(&suffix)])
        }
        HostOs::Other(id) => Err(Error::new(ErrorKind::Unsupported)
            .with_message(format!("unsupported operating system: {id}"))
            .with_hint(
                "Copy the plugin directory into your QGIS profile's python/plugins directory manually.",
            )),
    }
}

/// First existing candidate, else the standard (first) path. `exists` is a
/// probe so unit tests can substitute fake filesystem states.
pub fn resolve_plugins_dir<F>(env: &HostEnv, profile: &str, exists: F) -> Result<PathBuf, Error>
where
    F: Fn(&Path) -> bool,
{
    let candidates = candidate_plugin_roots(env, profile)?;
    for candidate in &candidates {
        if exists(candidate) {
            return Ok(candidate.clone());
        }
    }
    candidates.into_iter().next().ok_or_else(|| {
        Error::new(ErrorKind::Internal).with_message("no candidate plugin roots for this OS")
    })
}
