//! Configuration for the virtual file system

use crate::mapping::VirtualDirectoryMapping;
use crate::{Result, VfsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the virtual file system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsConfig {
    /// Virtual root that relative paths are resolved against; Zip entry
    /// paths are rooted here too
    pub base_path: PathBuf,

    /// Directory redirects applied before touching the real file system
    #[serde(default)]
    pub virtual_directory_mappings: Vec<VirtualDirectoryMapping>,

    /// Files that may not be unloaded without explicit permission
    #[serde(default)]
    pub required_files: Vec<String>,

    /// Scan `DD_DIREC` lumps for lump-directory mappings
    #[serde(default = "default_true")]
    pub load_lump_directory_mappings: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            virtual_directory_mappings: Vec::new(),
            required_files: Vec::new(),
            load_lump_directory_mappings: true,
        }
    }
}

impl VfsConfig {
    /// Create a new configuration with the specified base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the base path
    #[must_use]
    pub fn with_base_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.base_path = path.as_ref().to_path_buf();
        self
    }

    /// Add a virtual-directory mapping
    #[must_use]
    pub fn with_virtual_directory_mapping(
        mut self,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.virtual_directory_mappings
            .push(VirtualDirectoryMapping::new(source, destination));
        self
    }

    /// Mark a file as required
    #[must_use]
    pub fn with_required_file(mut self, path: impl Into<String>) -> Self {
        self.required_files.push(path.into());
        self
    }

    /// Enable or disable `DD_DIREC` scanning
    #[must_use]
    pub const fn with_lump_directory_mappings(mut self, enable: bool) -> Self {
        self.load_lump_directory_mappings = enable;
        self
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VfsError::Config(e.to_string()))
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| VfsError::Config(format!("{}: {e}", path.display())))
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| VfsError::Config(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let config = VfsConfig::new("/games/doom")
            .with_virtual_directory_mapping("auto", "/mnt/auto")
            .with_required_file("doom.wad")
            .with_lump_directory_mappings(false);

        assert_eq!(config.base_path, PathBuf::from("/games/doom"));
        assert_eq!(config.virtual_directory_mappings.len(), 1);
        assert_eq!(config.required_files, vec!["doom.wad".to_string()]);
        assert!(!config.load_lump_directory_mappings);
    }

    #[test]
    fn test_json_defaults() {
        let config = VfsConfig::from_json_str(r#"{ "base_path": "/games" }"#).unwrap();
        assert_eq!(config.base_path, PathBuf::from("/games"));
        assert!(config.virtual_directory_mappings.is_empty());
        assert!(config.load_lump_directory_mappings);
    }

    #[test]
    fn test_json_file_round_trip() {
        let config = VfsConfig::new("/games/heretic")
            .with_virtual_directory_mapping("/data", "/srv/data")
            .with_required_file("heretic.wad");

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), config.to_json().unwrap()).unwrap();

        assert_eq!(VfsConfig::from_json_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            VfsConfig::from_json_str("{ not json"),
            Err(VfsError::Config(_))
        ));
    }
}
