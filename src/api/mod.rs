//! Purpose: Define the public API boundary for the installer/packager library.
//! Exports: Core types and operations needed by the binaries and tests.
//! Invariants: This module is the only public path to core primitives.

pub use crate::core::artifacts::{count_files, strip_artifacts};
pub use crate::core::bundle::{
    BUNDLE_DIRS, BUNDLE_FILES, Bundle, CopyReport, PLUGIN_NAME, SkippedEntry,
};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::install::{
    InstallReport, UninstallOutcome, install, install_dependencies, uninstall,
};
pub use crate::core::metadata::{parse_version, read_version};
pub use crate::core::package::{PackageConfig, PackageReport, package};
pub use crate::core::target::{HostEnv, HostOs, candidate_plugin_roots, resolve_plugins_dir};
