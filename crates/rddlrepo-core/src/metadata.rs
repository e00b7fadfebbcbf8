//! Problem metadata declarations (`problem.toml`).
//!
//! A declaration is static data: it is parsed, never executed. It is read
//! only while scanning the archive; the manifest carries everything after.

use crate::record::{VisualizerSpec, validate_segment};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Declaration file that marks a leaf directory as a problem folder.
pub const METADATA_FILE: &str = "problem.toml";

/// Marker written into a context directory by context registration.
pub const CONTEXT_MARKER_FILE: &str = "context.toml";

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Invalid(String),
}

/// The declared fields of one problem folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemMetadata {
    pub name: String,
    pub description: String,
    pub context: String,
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    pub viz: String,
}

impl ProblemMetadata {
    pub fn parse(text: &str) -> Result<Self, MetadataError> {
        let metadata: Self = toml::from_str(text)?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| MetadataError::Io(format!("{}: {e}", path.display())))?;
        Self::parse(&text)
    }

    pub fn to_toml(&self) -> Result<String, MetadataError> {
        toml::to_string(self).map_err(|e| MetadataError::Serialize(e.to_string()))
    }

    /// The parsed visualizer binding.
    pub fn visualizer(&self) -> Result<VisualizerSpec, MetadataError> {
        VisualizerSpec::parse(&self.viz).map_err(|e| MetadataError::Invalid(e.to_string()))
    }

    fn validate(&self) -> Result<(), MetadataError> {
        validate_segment("name", &self.name).map_err(|e| MetadataError::Invalid(e.to_string()))?;
        if !self.context.is_empty() {
            validate_segment("context", &self.context)
                .map_err(|e| MetadataError::Invalid(e.to_string()))?;
        }
        if let Some(tag) = self.tags.iter().find(|t| t.contains(',')) {
            return Err(MetadataError::Invalid(format!(
                "tag <{tag}> must not contain ','"
            )));
        }
        self.visualizer()?;
        Ok(())
    }
}

/// Tags are an array of strings; a comma-joined string is accepted too.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Joined(String),
    }

    let raw: Vec<String> = match Tags::deserialize(deserializer)? {
        Tags::List(tags) => tags,
        Tags::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    // Blank tags cannot be told apart from separators once written to the manifest.
    Ok(raw
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect())
}
