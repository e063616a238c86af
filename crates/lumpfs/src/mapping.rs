//! Path mappings resolved before touching the real file system
//!
//! Two tables exist. Virtual-directory mappings rewrite a path prefix to
//! another directory. Lump-directory mappings come from `DD_DIREC` lumps and
//! make a lump readable under an arbitrary virtual path.

use crate::path;
use serde::{Deserialize, Serialize};

/// Prefix redirect from one virtual directory to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDirectoryMapping {
    /// Directory being redirected
    pub source: String,
    /// Directory it resolves to
    pub destination: String,
}

impl VirtualDirectoryMapping {
    /// Create a mapping
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// The mapping with both sides made absolute against `base`
    #[must_use]
    pub fn resolved(&self, base: &str) -> Self {
        Self {
            source: path::make_absolute(&self.source, base),
            destination: path::make_absolute(&self.destination, base),
        }
    }

    /// Rewrite an absolute, normalized path if it lies under the source.
    ///
    /// Matching is case-insensitive and only on whole segments, so `/data`
    /// does not capture `/database`.
    pub fn apply(&self, absolute: &str) -> Option<String> {
        let source = self.source.trim_end_matches('/');
        let head = absolute.get(..source.len())?;
        if !head.eq_ignore_ascii_case(source) {
            return None;
        }

        let rest = &absolute[source.len()..];
        if !rest.is_empty() && !rest.starts_with('/') && !source.is_empty() {
            return None;
        }

        Some(path::normalize(&format!(
            "{}/{}",
            self.destination,
            rest.trim_start_matches('/')
        )))
    }
}

/// A lump made readable under a virtual path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumpDirectoryMapping {
    /// Lump name to read
    pub lump_name: String,
    /// Absolute virtual path the lump answers to
    pub path: String,
}

/// Parse the text of a `DD_DIREC` lump.
///
/// Each line holds a lump name and a path separated by whitespace. `#`
/// starts a comment and blank lines are ignored. Relative paths are made
/// absolute against `base`.
pub fn parse_lump_directory(text: &str, base: &str) -> Vec<LumpDirectoryMapping> {
    text.lines()
        .filter_map(|line| {
            let line = line.split('#').next().unwrap_or_default().trim();
            let (lump_name, target) = line.split_once(char::is_whitespace)?;
            let target = target.trim();
            if target.is_empty() {
                return None;
            }

            Some(LumpDirectoryMapping {
                lump_name: lump_name.to_string(),
                path: path::make_absolute(target, base),
            })
        })
        .collect()
}
