//! Error types for archive discovery, manifest storage, and queries.

use crate::manifest::ManifestError;
use crate::metadata::MetadataError;
use std::fmt;

/// Failure class shared by every [`RepoError`] variant.
///
/// Callers branch on the kind; the variant carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DomainNotExist,
    InstanceNotExist,
    InstanceDuplication,
    ProblemDuplication,
    ContextNotExist,
    ContextDuplication,
    ManifestEmpty,
    UnresolvedDependency,
    InvalidInput,
    Metadata,
    LockBusy,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DomainNotExist => "domain_not_exist",
            Self::InstanceNotExist => "instance_not_exist",
            Self::InstanceDuplication => "instance_duplication",
            Self::ProblemDuplication => "problem_duplication",
            Self::ContextNotExist => "context_not_exist",
            Self::ContextDuplication => "context_duplication",
            Self::ManifestEmpty => "manifest_empty",
            Self::UnresolvedDependency => "unresolved_dependency",
            Self::InvalidInput => "invalid_input",
            Self::Metadata => "metadata",
            Self::LockBusy => "lock_busy",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the repository manager and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A candidate problem folder has no domain file.
    #[error("domain <{name}> does not have a {file} file in {location}")]
    DomainFileMissing {
        name: String,
        file: &'static str,
        location: String,
    },

    /// Lookup of a qualified name that is not in the index.
    #[error(
        "domain <{name}> does not exist in the repository, must be one of:\n{}",
        format_columns(.valid, 3)
    )]
    DomainNotExist { name: String, valid: Vec<String> },

    #[error("domain <{problem}> does not have instance <{instance}>")]
    InstanceNotExist { problem: String, instance: String },

    #[error("instance <{instance}> already exists in domain <{problem}>")]
    InstanceDuplication { problem: String, instance: String },

    #[error("domain <{name}> already exists: {detail}")]
    ProblemDuplication { name: String, detail: String },

    #[error(
        "context <{context}> does not exist in the repository, must be one of:\n{}",
        format_columns(.valid, 3)
    )]
    ContextNotExist { context: String, valid: Vec<String> },

    #[error("context <{context}> already exists")]
    ContextDuplication { context: String },

    /// The in-memory index holds no problems.
    #[error("repository manifest is empty: rebuild the repository")]
    ManifestEmpty,

    /// The manifest file exists but could not be loaded.
    #[error("failed to load repository manifest {path}, rebuild the repository: {source}")]
    ManifestCorrupt {
        path: String,
        #[source]
        source: ManifestError,
    },

    /// Writing the manifest during a build failed.
    #[error("failed to write repository manifest {path}: {source}")]
    ManifestWrite {
        path: String,
        #[source]
        source: ManifestError,
    },

    /// Raised by visualizer resolvers when their rendering backend is absent.
    #[error("visualizer backend <{backend}> is not available: {detail}")]
    UnresolvedDependency { backend: String, detail: String },

    #[error("invalid {what} <{value}>: {reason}")]
    InvalidInput {
        what: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid problem metadata in {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: MetadataError,
    },

    #[error(
        "archive lock busy: {lock_path} (if no rddlrepo process is running, \
         remove the lock file and retry)"
    )]
    LockBusy { lock_path: String },

    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DomainFileMissing { .. } | Self::DomainNotExist { .. } => {
                ErrorKind::DomainNotExist
            }
            Self::InstanceNotExist { .. } => ErrorKind::InstanceNotExist,
            Self::InstanceDuplication { .. } => ErrorKind::InstanceDuplication,
            Self::ProblemDuplication { .. } => ErrorKind::ProblemDuplication,
            Self::ContextNotExist { .. } => ErrorKind::ContextNotExist,
            Self::ContextDuplication { .. } => ErrorKind::ContextDuplication,
            Self::ManifestEmpty | Self::ManifestCorrupt { .. } => ErrorKind::ManifestEmpty,
            Self::ManifestWrite { .. } | Self::Io { .. } => ErrorKind::Io,
            Self::UnresolvedDependency { .. } => ErrorKind::UnresolvedDependency,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Metadata { .. } => ErrorKind::Metadata,
            Self::LockBusy { .. } => ErrorKind::LockBusy,
        }
    }

    pub(crate) fn io(path: impl fmt::Display, err: impl fmt::Display) -> Self {
        Self::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid(what: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            what,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Lay out labels left-aligned in `cols` columns.
///
/// Every cell is padded to one more than the longest label; a newline
/// follows each full row.
pub fn format_columns(values: &[String], cols: usize) -> String {
    let Some(longest) = values.iter().map(|v| v.chars().count()).max() else {
        return String::new();
    };
    let width = longest + 1;
    let cols = cols.max(1);
    let mut out = String::new();
    for (count, item) in values.iter().enumerate() {
        out.push_str(&format!("{item:<width$}"));
        if (count + 1) % cols == 0 {
            out.push('\n');
        }
    }
    out
}
