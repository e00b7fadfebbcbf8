//! Archive discovery.
//!
//! Only leaf directories are inspected. A leaf holding a `problem.toml` is a
//! problem folder; every other leaf is ignored. Any broken problem folder
//! aborts the whole scan.

use crate::error::RepoError;
use crate::index::RepoIndex;
use crate::metadata::{METADATA_FILE, ProblemMetadata};
use crate::record::{DOMAIN_FILE, ProblemRecord, qualified_name, sort_instance_ids};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use walkdir::{DirEntry, WalkDir};

/// Build artifact directory skipped during the walk.
pub const CACHE_DIR: &str = "__pycache__";

fn instance_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^instance([0-9]+)\.rddl$").expect("instance file regex must compile")
    })
}

fn is_ignored_dir_name(name: &str) -> bool {
    name == CACHE_DIR || name.starts_with('.')
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && is_ignored_dir_name(&entry.file_name().to_string_lossy())
}

/// Walk `archive_root` and index every problem folder found.
pub fn scan_archive(archive_root: &Path) -> Result<RepoIndex, RepoError> {
    if !archive_root.is_dir() {
        return Err(RepoError::io(
            archive_root.display(),
            "archive root is not a directory",
        ));
    }

    let mut index = RepoIndex::default();
    let walker = WalkDir::new(archive_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| archive_root.display().to_string());
            RepoError::io(path, e)
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(record) = inspect_dir(entry.path(), &index)? {
            tracing::debug!(
                name = %record.name,
                location = %record.location.display(),
                "discovered problem"
            );
            index.insert(record)?;
        }
    }

    tracing::info!(
        problems = index.len(),
        contexts = index.context_count(),
        root = %archive_root.display(),
        "archive scan complete"
    );
    Ok(index)
}

/// Turn one directory into a record, if it is a problem folder.
fn inspect_dir(dir: &Path, index: &RepoIndex) -> Result<Option<ProblemRecord>, RepoError> {
    let listing = fs::read_dir(dir).map_err(|e| RepoError::io(dir.display(), e))?;
    let mut files = BTreeSet::new();
    for child in listing {
        let child = child.map_err(|e| RepoError::io(dir.display(), e))?;
        let file_type = child
            .file_type()
            .map_err(|e| RepoError::io(child.path().display(), e))?;
        let name = child.file_name().to_string_lossy().into_owned();
        if file_type.is_dir() {
            if !is_ignored_dir_name(&name) {
                return Ok(None);
            }
        } else {
            files.insert(name);
        }
    }

    if !files.contains(METADATA_FILE) {
        tracing::debug!(dir = %dir.display(), "leaf directory without {METADATA_FILE}, skipped");
        return Ok(None);
    }

    let metadata_path = dir.join(METADATA_FILE);
    let metadata = ProblemMetadata::from_path(&metadata_path).map_err(|source| {
        RepoError::Metadata {
            path: metadata_path.display().to_string(),
            source,
        }
    })?;
    let viz = metadata.visualizer().map_err(|source| RepoError::Metadata {
        path: metadata_path.display().to_string(),
        source,
    })?;
    let name = qualified_name(&metadata.name, &metadata.context);

    if let Some(existing) = index.get(&name) {
        return Err(RepoError::ProblemDuplication {
            detail: format!(
                "declared in both {} and {}; problem names must be unique",
                existing.location.display(),
                dir.display()
            ),
            name,
        });
    }
    if !files.contains(DOMAIN_FILE) {
        return Err(RepoError::DomainFileMissing {
            name,
            file: DOMAIN_FILE,
            location: dir.display().to_string(),
        });
    }

    let mut instances: Vec<String> = files
        .iter()
        .filter_map(|file| instance_file_re().captures(file))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    sort_instance_ids(&mut instances);

    Ok(Some(ProblemRecord {
        name,
        description: metadata.description,
        location: dir.to_path_buf(),
        instances,
        viz,
        context: metadata.context,
        tags: metadata.tags,
    }))
}
