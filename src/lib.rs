//! Purpose: Shared core library backing the installer and packager binaries.
//! Exports: `api` (bundle, target resolution, install, package, errors), `report`.
//! Role: Internal library for the two CLIs; not a stable public SDK.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
mod core;
pub mod report;
