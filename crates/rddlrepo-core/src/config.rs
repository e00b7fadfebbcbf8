//! Repository configuration.

use crate::error::RepoError;
use crate::manifest::MANIFEST_FILE;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the archive and its manifest live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    pub archive_root: PathBuf,
    pub manifest_path: PathBuf,
    /// Rescan the archive even if a manifest exists.
    pub rebuild: bool,
    /// Leading segment of every visualizer module path.
    pub viz_namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    archive_root: PathBuf,
    #[serde(default)]
    manifest_path: Option<PathBuf>,
    #[serde(default)]
    viz_namespace: Option<String>,
}

impl RepoConfig {
    pub fn new(archive_root: impl Into<PathBuf>) -> Self {
        let archive_root = archive_root.into();
        let manifest_path = archive_root.join(MANIFEST_FILE);
        Self {
            archive_root,
            manifest_path,
            rebuild: false,
            viz_namespace: None,
        }
    }

    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_rebuild(mut self, rebuild: bool) -> Self {
        self.rebuild = rebuild;
        self
    }

    pub fn with_viz_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.viz_namespace = Some(namespace.into());
        self
    }

    /// Read a TOML config file. Relative paths resolve against its directory.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| RepoError::io(path.display(), e))?;
        let file: ConfigFile = toml::from_str(&text).map_err(|e| {
            RepoError::invalid("config file", &path.display().to_string(), e.to_string())
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let archive_root = base.join(file.archive_root);
        let mut config = Self::new(archive_root);
        if let Some(manifest_path) = file.manifest_path {
            config.manifest_path = base.join(manifest_path);
        }
        config.viz_namespace = file.viz_namespace;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn manifest_defaults_into_archive_root() {
        let config = RepoConfig::new("/data/archive");
        assert_eq!(config.manifest_path, PathBuf::from("/data/archive/manifest.csv"));
        assert!(!config.rebuild);
    }

    #[test]
    fn config_file_paths_resolve_against_its_directory() {
        let dir = TempDir::new().expect("temp dir should exist");
        let path = dir.path().join("rddlrepo.toml");
        fs::write(
            &path,
            "archive_root = \"archive\"\nmanifest_path = \"cache/manifest.csv\"\nviz_namespace = \"rddlrepository\"\n",
        )
        .expect("config should be written");

        let config = RepoConfig::from_toml_path(&path).expect("config should load");
        assert_eq!(config.archive_root, dir.path().join("archive"));
        assert_eq!(config.manifest_path, dir.path().join("cache/manifest.csv"));
        assert_eq!(config.viz_namespace.as_deref(), Some("rddlrepository"));
    }

    #[test]
    fn config_file_rejects_unknown_keys() {
        let dir = TempDir::new().expect("temp dir should exist");
        let path = dir.path().join("rddlrepo.toml");
        fs::write(&path, "archive_root = \"a\"\nrebuild_always = true\n")
            .expect("config should be written");
        assert!(RepoConfig::from_toml_path(&path).is_err());
    }
}
