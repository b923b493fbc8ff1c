pub mod artifacts;
pub mod bundle;
pub mod error;
pub mod install;
pub mod metadata;
pub mod package;
pub mod target;
