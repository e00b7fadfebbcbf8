//! Read view over one problem record.

use crate::error::RepoError;
use crate::record::{
    DOMAIN_FILE, ProblemRecord, instance_file_name, is_instance_id, sort_instance_ids,
};
use crate::visualizer::VisualizerRef;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A problem as handed out by the manager.
///
/// The handle owns a copy of the record taken at lookup time. Later
/// rebuilds of the manager do not reach it, and instances registered
/// through it are not seen by the manager until the next rebuild.
#[derive(Debug, Clone)]
pub struct ProblemHandle {
    record: ProblemRecord,
    archive_root: PathBuf,
    viz_namespace: Option<String>,
}

impl ProblemHandle {
    pub(crate) fn new(
        record: ProblemRecord,
        archive_root: PathBuf,
        viz_namespace: Option<String>,
    ) -> Self {
        Self {
            record,
            archive_root,
            viz_namespace,
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn description(&self) -> &str {
        &self.record.description
    }

    pub fn location(&self) -> &Path {
        &self.record.location
    }

    pub fn context(&self) -> &str {
        self.record.group()
    }

    pub fn tags(&self) -> &[String] {
        &self.record.tags
    }

    pub fn record(&self) -> &ProblemRecord {
        &self.record
    }

    /// Path of the domain file. Existence was checked when the archive was scanned.
    pub fn get_domain(&self) -> PathBuf {
        self.record.location.join(DOMAIN_FILE)
    }

    /// Path of instance `id`, if the problem has it.
    pub fn get_instance(&self, id: impl fmt::Display) -> Result<PathBuf, RepoError> {
        let id = id.to_string();
        if !self.record.has_instance(&id) {
            return Err(RepoError::InstanceNotExist {
                problem: self.record.name.clone(),
                instance: id,
            });
        }
        Ok(self.record.location.join(instance_file_name(&id)))
    }

    pub fn list_instances(&self) -> &[String] {
        &self.record.instances
    }

    /// Reference to the declared visualizer, if any.
    pub fn get_visualizer(&self) -> Result<Option<VisualizerRef>, RepoError> {
        VisualizerRef::locate(
            &self.record.viz,
            &self.record.location,
            &self.archive_root,
            self.viz_namespace.as_deref(),
        )
    }

    /// Write a new instance file and add it to this handle.
    pub fn register_instance(
        &mut self,
        id: impl fmt::Display,
        rddl: &str,
    ) -> Result<PathBuf, RepoError> {
        let id = id.to_string();
        if !is_instance_id(&id) {
            return Err(RepoError::invalid(
                "instance id",
                &id,
                "must contain only ASCII digits",
            ));
        }
        let path = self.record.location.join(instance_file_name(&id));
        let duplicate = || RepoError::InstanceDuplication {
            problem: self.record.name.clone(),
            instance: id.clone(),
        };
        if self.record.has_instance(&id) {
            return Err(duplicate());
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(duplicate());
            }
            Err(err) => return Err(RepoError::io(path.display(), err)),
        };
        let written = file
            .write_all(rddl.as_bytes())
            .and_then(|()| file.sync_all());
        if let Err(err) = written {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(RepoError::io(path.display(), err));
        }

        self.record.instances.push(id.clone());
        sort_instance_ids(&mut self.record.instances);
        tracing::info!(problem = %self.record.name, instance = %id, "registered instance");
        Ok(path)
    }
}

impl fmt::Display for ProblemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.record.name)?;
        writeln!(f, "description: {}", self.record.description)?;
        writeln!(f, "context: {}", self.record.group())?;
        writeln!(f, "location: {}", self.record.location.display())?;
        writeln!(f, "instances: {}", self.record.instances.join(", "))?;
        if !self.record.tags.is_empty() {
            writeln!(f, "tags: {}", self.record.tags.join(", "))?;
        }
        write!(f, "viz: {}", self.record.viz)
    }
}
