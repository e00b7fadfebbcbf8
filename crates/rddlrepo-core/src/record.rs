//! Problem record: one discovered benchmark problem.

use crate::error::RepoError;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Group label for problems that declare an empty context.
pub const DEFAULT_CONTEXT: &str = "standalone";

/// Domain definition file every problem folder must contain.
pub const DOMAIN_FILE: &str = "domain.rddl";

/// Manifest spelling of "no visualizer".
pub const NO_VISUALIZER: &str = "None";

/// Declared visualizer binding of a problem.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualizerSpec {
    #[default]
    None,
    /// `<module>.<ClassName>` relative to the problem folder.
    Declared { module: String, class: String },
}

impl VisualizerSpec {
    /// Parse `Module.Class`, `None`, or the empty string.
    pub fn parse(raw: &str) -> Result<Self, RepoError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NO_VISUALIZER {
            return Ok(Self::None);
        }
        match trimmed.rsplit_once('.') {
            Some((module, class)) if !module.is_empty() && !class.is_empty() => {
                Ok(Self::Declared {
                    module: module.to_string(),
                    class: class.to_string(),
                })
            }
            _ => Err(RepoError::invalid(
                "visualizer",
                raw,
                "expected <module>.<ClassName> or None",
            )),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for VisualizerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str(NO_VISUALIZER),
            Self::Declared { module, class } => write!(f, "{module}.{class}"),
        }
    }
}

/// One entry of the archive index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemRecord {
    /// Qualified name, unique across the archive.
    pub name: String,
    pub description: String,
    /// Absolute folder holding the domain and instance files.
    pub location: PathBuf,
    /// Instance ids in ascending numeric order.
    pub instances: Vec<String>,
    pub viz: VisualizerSpec,
    /// Context exactly as declared; may be empty.
    pub context: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ProblemRecord {
    /// The context group this record is filed under.
    pub fn group(&self) -> &str {
        normalize_context(&self.context)
    }

    pub fn has_instance(&self, id: &str) -> bool {
        self.instances.iter().any(|i| i == id)
    }
}

/// `<name>_<context>`, or just `<name>` for an empty context.
pub fn qualified_name(name: &str, context: &str) -> String {
    if context.is_empty() {
        name.to_string()
    } else {
        format!("{name}_{context}")
    }
}

pub fn normalize_context(context: &str) -> &str {
    if context.is_empty() {
        DEFAULT_CONTEXT
    } else {
        context
    }
}

/// File name of instance `id` inside a problem folder.
pub fn instance_file_name(id: &str) -> String {
    format!("instance{id}.rddl")
}

/// Numeric ordering of digit strings without parsing into a bounded integer.
pub fn compare_instance_ids(a: &str, b: &str) -> Ordering {
    let ta = a.trim_start_matches('0');
    let tb = b.trim_start_matches('0');
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.cmp(b))
}

pub fn sort_instance_ids(ids: &mut [String]) {
    ids.sort_by(|a, b| compare_instance_ids(a, b));
}

pub fn is_instance_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Reject names that cannot be a single archive folder or manifest token.
pub fn validate_segment(what: &'static str, value: &str) -> Result<(), RepoError> {
    if value.trim().is_empty() {
        return Err(RepoError::invalid(what, value, "must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(RepoError::invalid(what, value, "must not be a relative path"));
    }
    if let Some(bad) = value.chars().find(|c| matches!(c, '/' | '\\' | ',') || c.is_control()) {
        return Err(RepoError::invalid(
            what,
            value,
            format!("must not contain {bad:?}"),
        ));
    }
    Ok(())
}
