//! In-memory archive index.
//!
//! This is the query boundary of `rddlrepo-core`:
//! - `by_name`: qualified name to record, in discovery order
//! - `by_context`: context group to qualified names, in discovery order
//!
//! An index is built whole (by a scan or a manifest load) and replaced whole;
//! records are never edited in place.

use crate::error::RepoError;
use crate::manifest::{ManifestError, read_manifest_from_path, write_manifest_to_path};
use crate::record::ProblemRecord;
use indexmap::IndexMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoIndex {
    by_name: IndexMap<String, ProblemRecord>,
    by_context: IndexMap<String, Vec<String>>,
}

impl RepoIndex {
    /// Build an index from records in discovery order.
    ///
    /// A repeated qualified name is a [`RepoError::ProblemDuplication`].
    pub fn from_records(
        records: impl IntoIterator<Item = ProblemRecord>,
    ) -> Result<Self, RepoError> {
        let mut index = Self::default();
        for record in records {
            index.insert(record)?;
        }
        Ok(index)
    }

    /// Load an index from a manifest file. A missing file loads as empty.
    pub fn load_manifest(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let records = read_manifest_from_path(path)?;
        let mut index = Self::default();
        for record in records {
            if index.contains(&record.name) {
                return Err(ManifestError::DuplicateName(record.name));
            }
            index.insert_unchecked(record);
        }
        Ok(index)
    }

    /// Persist the index to a manifest file, rows in discovery order.
    pub fn save_manifest(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let records: Vec<&ProblemRecord> = self.by_name.values().collect();
        write_manifest_to_path(path, &records)
    }

    /// Add one record, filing it under its normalized context.
    pub fn insert(&mut self, record: ProblemRecord) -> Result<(), RepoError> {
        if let Some(existing) = self.by_name.get(&record.name) {
            return Err(RepoError::ProblemDuplication {
                name: record.name.clone(),
                detail: format!(
                    "declared in both {} and {}; problem names must be unique",
                    existing.location.display(),
                    record.location.display()
                ),
            });
        }
        self.insert_unchecked(record);
        Ok(())
    }

    fn insert_unchecked(&mut self, record: ProblemRecord) {
        self.by_context
            .entry(record.group().to_string())
            .or_default()
            .push(record.name.clone());
        self.by_name.insert(record.name.clone(), record);
    }

    /// Open an empty context group. Returns false if it already exists.
    pub fn add_context(&mut self, context: &str) -> bool {
        if self.by_context.contains_key(context) {
            return false;
        }
        self.by_context.insert(context.to_string(), Vec::new());
        true
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn has_context(&self, context: &str) -> bool {
        self.by_context.contains_key(context)
    }

    pub fn get(&self, name: &str) -> Option<&ProblemRecord> {
        self.by_name.get(name)
    }

    /// Qualified names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Context labels in first-seen order.
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.by_context.keys().map(String::as_str)
    }

    /// Qualified names filed under `context`.
    pub fn problems_in(&self, context: &str) -> Option<&[String]> {
        self.by_context.get(context).map(Vec::as_slice)
    }

    pub fn records(&self) -> impl Iterator<Item = &ProblemRecord> {
        self.by_name.values()
    }

    pub fn context_count(&self) -> usize {
        self.by_context.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::record::{DEFAULT_CONTEXT, VisualizerSpec};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn record(name: &str, context: &str) -> ProblemRecord {
        ProblemRecord {
            name: name.to_string(),
            description: String::new(),
            location: PathBuf::from(format!("/archive/{name}")),
            instances: vec!["1".to_string()],
            viz: VisualizerSpec::None,
            context: context.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn empty_context_is_filed_under_default_group() {
        let index = RepoIndex::from_records([record("Foo", ""), record("Bar_gym", "gym")])
            .expect("index should build");
        assert_eq!(index.problems_in(DEFAULT_CONTEXT), Some(&["Foo".to_string()][..]));
        assert_eq!(index.contexts().collect::<Vec<_>>(), vec![DEFAULT_CONTEXT, "gym"]);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let err = RepoIndex::from_records([record("Foo", ""), record("Foo", "")])
            .expect_err("duplicate should fail");
        assert_eq!(err.kind(), ErrorKind::ProblemDuplication);
    }

    #[test]
    fn context_groups_keep_discovery_order() {
        let index = RepoIndex::from_records([
            record("Zeta_gym", "gym"),
            record("Alpha", ""),
            record("Beta_gym", "gym"),
        ])
        .expect("index should build");
        assert_eq!(
            index.problems_in("gym").unwrap(),
            &["Zeta_gym".to_string(), "Beta_gym".to_string()]
        );
    }

    #[test]
    fn manifest_round_trip_preserves_groups() {
        let dir = TempDir::new().expect("temp dir should exist");
        let path = dir.path().join("manifest.csv");
        let index = RepoIndex::from_records([
            record("Zeta_gym", "gym"),
            record("Alpha", ""),
            record("Beta_gym", "gym"),
        ])
        .expect("index should build");

        index.save_manifest(&path).expect("manifest should save");
        let loaded = RepoIndex::load_manifest(&path).expect("manifest should load");
        assert_eq!(loaded, index);
    }

    #[test]
    fn add_context_opens_empty_group_once() {
        let mut index = RepoIndex::default();
        assert!(index.add_context("newctx"));
        assert!(!index.add_context("newctx"));
        assert_eq!(index.problems_in("newctx"), Some(&[][..]));
        assert!(index.is_empty());
    }
}
