//! Repository manager: load-or-rebuild lifecycle, queries, registration.
//!
//! ```text
//! open(config)
//!   ├─ rebuild requested / no manifest → scan archive → write manifest
//!   └─ manifest present                → load manifest (failure is fatal)
//! ```
//!
//! Every rebuild builds a complete [`RepoIndex`] first and only then replaces
//! the published one, so a failed rebuild leaves the previous index intact.
//! Queries take `&self`; rebuilds and registrations take `&mut self`.

use crate::config::RepoConfig;
use crate::error::RepoError;
use crate::handle::ProblemHandle;
use crate::index::RepoIndex;
use crate::lock::ArchiveLockGuard;
use crate::metadata::{CONTEXT_MARKER_FILE, METADATA_FILE, ProblemMetadata};
use crate::record::{
    DEFAULT_CONTEXT, DOMAIN_FILE, NO_VISUALIZER, ProblemRecord, VisualizerSpec, qualified_name,
    validate_segment,
};
use crate::scanner::scan_archive;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Input of [`RepositoryManager::register_domain`].
#[derive(Debug, Clone)]
pub struct DomainRegistration {
    pub name: String,
    pub context: String,
    pub rddl: String,
    pub description: Option<String>,
    /// `<module>.<ClassName>`; absent means no visualizer.
    pub viz: Option<String>,
}

impl DomainRegistration {
    pub fn new(
        name: impl Into<String>,
        context: impl Into<String>,
        rddl: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            rddl: rddl.into(),
            description: None,
            viz: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_viz(mut self, viz: impl Into<String>) -> Self {
        self.viz = Some(viz.into());
        self
    }
}

#[derive(Debug)]
pub struct RepositoryManager {
    config: RepoConfig,
    archive_root: PathBuf,
    index: RepoIndex,
}

impl RepositoryManager {
    /// Load the manifest, or rebuild it from the archive.
    ///
    /// A manifest that exists but cannot be loaded is
    /// [`RepoError::ManifestCorrupt`]; reopen with `rebuild` set to recover.
    pub fn open(config: RepoConfig) -> Result<Self, RepoError> {
        let archive_root = absolute_root(&config.archive_root);
        let mut manager = Self {
            config,
            archive_root,
            index: RepoIndex::default(),
        };

        if manager.config.rebuild || !manager.config.manifest_path.is_file() {
            manager.rebuild()?;
        } else {
            let path = &manager.config.manifest_path;
            manager.index = RepoIndex::load_manifest(path).map_err(|source| {
                tracing::warn!(
                    manifest = %path.display(),
                    error = %source,
                    "manifest load failed"
                );
                RepoError::ManifestCorrupt {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            tracing::info!(
                problems = manager.index.len(),
                contexts = manager.index.context_count(),
                manifest = %path.display(),
                "manifest loaded"
            );
        }
        Ok(manager)
    }

    /// Rescan the archive and rewrite the manifest.
    pub fn rebuild(&mut self) -> Result<(), RepoError> {
        let _guard = ArchiveLockGuard::acquire(&self.config.manifest_path)?;
        self.rebuild_locked()
    }

    fn rebuild_locked(&mut self) -> Result<(), RepoError> {
        let index = scan_archive(&self.archive_root)?;
        let path = &self.config.manifest_path;
        index
            .save_manifest(path)
            .map_err(|source| RepoError::ManifestWrite {
                path: path.display().to_string(),
                source,
            })?;
        tracing::info!(
            problems = index.len(),
            contexts = index.context_count(),
            manifest = %path.display(),
            "manifest written"
        );
        self.index = index;
        Ok(())
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Absolute archive root used for scans and visualizer references.
    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    pub fn manifest_path(&self) -> &Path {
        &self.config.manifest_path
    }

    pub fn index(&self) -> &RepoIndex {
        &self.index
    }

    /// All qualified names, in discovery order.
    pub fn list_problems(&self) -> Result<Vec<String>, RepoError> {
        if self.index.is_empty() {
            return Err(RepoError::ManifestEmpty);
        }
        Ok(self.index.names().map(str::to_string).collect())
    }

    pub fn list_contexts(&self) -> Result<Vec<String>, RepoError> {
        if self.index.context_count() == 0 {
            return Err(RepoError::ManifestEmpty);
        }
        Ok(self.index.contexts().map(str::to_string).collect())
    }

    pub fn list_problems_by_context(&self, context: &str) -> Result<Vec<String>, RepoError> {
        self.index
            .problems_in(context)
            .map(<[String]>::to_vec)
            .ok_or_else(|| RepoError::ContextNotExist {
                context: context.to_string(),
                valid: self.index.contexts().map(str::to_string).collect(),
            })
    }

    /// Snapshot of one problem.
    pub fn get_problem(&self, name: &str) -> Result<ProblemHandle, RepoError> {
        let record = self
            .index
            .get(name)
            .ok_or_else(|| RepoError::DomainNotExist {
                name: name.to_string(),
                valid: self.names_for_display(),
            })?;
        Ok(ProblemHandle::new(
            record.clone(),
            self.archive_root.clone(),
            self.config.viz_namespace.clone(),
        ))
    }

    /// Standalone names first, competition (`ippc`) names after.
    fn names_for_display(&self) -> Vec<String> {
        let (competition, standalone): (Vec<&ProblemRecord>, Vec<&ProblemRecord>) = self
            .index
            .records()
            .partition(|r| r.name.to_ascii_lowercase().contains("ippc"));
        standalone
            .into_iter()
            .chain(competition)
            .map(|r| r.name.clone())
            .collect()
    }

    /// Create an empty context directory and open its group.
    pub fn register_context(&mut self, context: &str) -> Result<PathBuf, RepoError> {
        validate_segment("context", context)?;
        let dir = self.archive_root.join(context);
        if self.index.has_context(context) || dir.exists() {
            return Err(RepoError::ContextDuplication {
                context: context.to_string(),
            });
        }

        let _guard = ArchiveLockGuard::acquire(&self.config.manifest_path)?;
        fs::create_dir(&dir).map_err(|e| RepoError::io(dir.display(), e))?;
        let marker = dir.join(CONTEXT_MARKER_FILE);
        if let Err(err) = fs::write(&marker, "") {
            let _ = fs::remove_dir_all(&dir);
            return Err(RepoError::io(marker.display(), err));
        }

        self.index.add_context(context);
        tracing::info!(context, dir = %dir.display(), "registered context");
        Ok(dir)
    }

    /// Create a problem folder under an existing context, then rebuild.
    ///
    /// Returns the qualified name of the new problem. On failure the new
    /// folder is removed and the previous index stays in place.
    pub fn register_domain(
        &mut self,
        registration: DomainRegistration,
    ) -> Result<String, RepoError> {
        let DomainRegistration {
            name,
            context,
            rddl,
            description,
            viz,
        } = registration;
        validate_segment("name", &name)?;
        validate_segment("context", &context)?;

        let context_dir = self.archive_root.join(&context);
        if !self.index.has_context(&context) && !context_dir.is_dir() {
            return Err(RepoError::ContextNotExist {
                context,
                valid: self.index.contexts().map(str::to_string).collect(),
            });
        }

        let declared_context = if context == DEFAULT_CONTEXT {
            String::new()
        } else {
            context.clone()
        };
        let qualified = qualified_name(&name, &declared_context);
        let domain_dir = context_dir.join(&name);
        if self.index.contains(&qualified) || domain_dir.exists() {
            return Err(RepoError::ProblemDuplication {
                name: qualified,
                detail: format!("already registered in context <{context}>"),
            });
        }

        let viz = match viz {
            Some(raw) => VisualizerSpec::parse(&raw)?.to_string(),
            None => NO_VISUALIZER.to_string(),
        };
        let description = description.unwrap_or_else(|| {
            format!(
                "User-defined domain with name {name} in context {context}, created on {}.",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            )
        });
        let metadata = ProblemMetadata {
            name,
            description,
            context: declared_context,
            tags: Vec::new(),
            viz,
        };
        let metadata_text = metadata.to_toml().map_err(|source| RepoError::Metadata {
            path: domain_dir.join(METADATA_FILE).display().to_string(),
            source,
        })?;

        let _guard = ArchiveLockGuard::acquire(&self.config.manifest_path)?;
        // A context known only to the index has no directory yet.
        let creates_context_dir = !context_dir.is_dir();
        let result = fs::create_dir_all(&domain_dir)
            .map_err(|e| RepoError::io(domain_dir.display(), e))
            .and_then(|()| write_problem_files(&domain_dir, &rddl, &metadata_text))
            .and_then(|()| self.rebuild_locked());
        if let Err(err) = result {
            tracing::warn!(
                problem = %qualified,
                dir = %domain_dir.display(),
                error = %err,
                "domain registration rolled back"
            );
            let _ = fs::remove_dir_all(&domain_dir);
            if creates_context_dir {
                let _ = fs::remove_dir(&context_dir);
            }
            return Err(err);
        }

        tracing::info!(problem = %qualified, context = %context, "registered domain");
        Ok(qualified)
    }
}

/// Domain file first; the metadata file makes the folder visible to scans.
fn write_problem_files(dir: &Path, rddl: &str, metadata_text: &str) -> Result<(), RepoError> {
    let domain_path = dir.join(DOMAIN_FILE);
    fs::write(&domain_path, rddl).map_err(|e| RepoError::io(domain_path.display(), e))?;
    let metadata_path = dir.join(METADATA_FILE);
    fs::write(&metadata_path, metadata_text)
        .map_err(|e| RepoError::io(metadata_path.display(), e))?;
    Ok(())
}

fn absolute_root(root: &Path) -> PathBuf {
    fs::canonicalize(root)
        .or_else(|_| std::path::absolute(root))
        .unwrap_or_else(|_| root.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn problem(root: &Path, rel: &str, name: &str, context: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).expect("problem dir should be created");
        fs::write(
            dir.join(METADATA_FILE),
            format!(
                "name = \"{name}\"\ndescription = \"{name}\"\ncontext = \"{context}\"\ntags = []\nviz = \"None\"\n"
            ),
        )
        .expect("metadata should be written");
        fs::write(dir.join(DOMAIN_FILE), "domain {}").expect("domain should be written");
        fs::write(dir.join("instance1.rddl"), "instance {}").expect("instance should be written");
    }

    #[test]
    fn get_problem_error_lists_standalone_before_competition() {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "ippc2014/Wildfire", "Wildfire", "ippc2014");
        problem(root.path(), "standalone/Zed", "Zed", "");

        let manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        let err = manager.get_problem("Nope").expect_err("unknown name");
        match err {
            RepoError::DomainNotExist { valid, .. } => {
                assert_eq!(valid, vec!["Zed", "Wildfire_ippc2014"]);
            }
            other => panic!("expected DomainNotExist, got {other:?}"),
        }
    }

    #[test]
    fn handle_is_a_snapshot() {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "standalone/Foo", "Foo", "");

        let mut manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        let handle = manager.get_problem("Foo").expect("Foo should exist");
        fs::write(root.path().join("standalone/Foo/instance2.rddl"), "").expect("write");
        manager.rebuild().expect("rebuild");

        assert_eq!(handle.list_instances(), &["1"]);
        let fresh = manager.get_problem("Foo").expect("Foo should exist");
        assert_eq!(fresh.list_instances(), &["1", "2"]);
    }

    #[test]
    fn register_domain_into_standalone_uses_bare_name() {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "standalone/Foo", "Foo", "");

        let mut manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        let name = manager
            .register_domain(DomainRegistration::new("Qux", DEFAULT_CONTEXT, "domain qux {}"))
            .expect("registration should succeed");
        assert_eq!(name, "Qux");
        assert_eq!(
            manager.list_problems_by_context(DEFAULT_CONTEXT).unwrap(),
            vec!["Foo", "Qux"]
        );
    }

    #[test]
    fn failed_rebuild_rolls_back_registration() {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "standalone/Foo", "Foo", "");

        let mut manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        let broken = root.path().join("standalone/Broken");
        fs::create_dir_all(&broken).expect("broken dir should be created");
        fs::write(
            broken.join(METADATA_FILE),
            "name = \"Broken\"\ndescription = \"\"\ncontext = \"\"\ntags = []\nviz = \"None\"\n",
        )
        .expect("metadata should be written");

        let err = manager
            .register_domain(DomainRegistration::new("Qux", DEFAULT_CONTEXT, "domain {}"))
            .expect_err("rebuild should trip over the broken folder");
        assert_eq!(err.kind(), ErrorKind::DomainNotExist);
        assert!(!root.path().join("standalone/Qux").exists());
        assert!(manager.index().contains("Foo"));
        assert!(!manager.index().contains("Qux"));
    }

    #[test]
    fn failed_registration_removes_context_dir_it_created() {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "standalone/Foo", "Foo", "");
        problem(root.path(), "gym/CartPole", "CartPole", "gym");

        let mut manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        fs::remove_dir_all(root.path().join("gym")).expect("gym dir should be removed");
        let broken = root.path().join("standalone/Broken");
        fs::create_dir_all(&broken).expect("broken dir should be created");
        fs::write(
            broken.join(METADATA_FILE),
            "name = \"Broken\"\ndescription = \"\"\ncontext = \"\"\ntags = []\nviz = \"None\"\n",
        )
        .expect("metadata should be written");

        let err = manager
            .register_domain(DomainRegistration::new("Qux", "gym", "domain {}"))
            .expect_err("rebuild should trip over the broken folder");
        assert_eq!(err.kind(), ErrorKind::DomainNotExist);
        assert!(!root.path().join("gym").exists());
        assert!(manager.index().has_context("gym"));
    }

    #[test]
    fn failed_registration_keeps_existing_context_dir() {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "standalone/Foo", "Foo", "");
        fs::create_dir_all(root.path().join("gym")).expect("gym dir should be created");

        let mut manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        let broken = root.path().join("standalone/Broken");
        fs::create_dir_all(&broken).expect("broken dir should be created");
        fs::write(
            broken.join(METADATA_FILE),
            "name = \"Broken\"\ndescription = \"\"\ncontext = \"\"\ntags = []\nviz = \"None\"\n",
        )
        .expect("metadata should be written");

        manager
            .register_domain(DomainRegistration::new("Qux", "gym", "domain {}"))
            .expect_err("rebuild should trip over the broken folder");
        assert!(root.path().join("gym").is_dir());
        assert!(!root.path().join("gym/Qux").exists());
    }

    #[test]
    fn register_domain_rejects_malformed_viz_before_touching_disk() {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "standalone/Foo", "Foo", "");

        let mut manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        let err = manager
            .register_domain(
                DomainRegistration::new("Qux", DEFAULT_CONTEXT, "domain {}").with_viz("NoClass"),
            )
            .expect_err("viz without class should fail");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!root.path().join("standalone/Qux").exists());
    }
}
