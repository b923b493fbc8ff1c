//! Purpose: Read the plugin version out of `metadata.txt`.
//! Exports: `read_version`, `parse_version`.
//! Invariants: The first `version=` line wins; a missing or empty value is fatal.

use std::fs;
use std::path::Path;

use super::error::{Error, ErrorKind};

pub fn read_version(path: &Path) -> Result<String, Error> {
    let content = fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Metadata)
            .with_message("failed to read metadata file")
            .with_path(path)
            .with_source(err)
    })?;
    parse_version(&content).ok_or_else(|| {
        Error::new(ErrorKind::Metadata)
            .with_message("metadata file has no version= entry")
            .with_path(path)
            .with_hint("Add a line like `version=0.1.0` to metadata.txt.")
    })
}

/// First `version=` value in key=value metadata, whitespace-trimmed. Returns
/// `None` when the key is absent or the value is empty.
pub fn parse_version(content: &str) -> Option<String> {
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != "version" {
            continue;
        }
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        return Some(value.to_string());
    }
    None
}
