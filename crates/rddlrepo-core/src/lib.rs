//! # rddlrepo-core
//!
//! Catalog layer for an archive of RDDL benchmark problems.
//!
//! This crate provides:
//! - `ProblemRecord` and the `problem.toml` metadata declaration
//! - archive discovery (`scan_archive`)
//! - manifest read/write (portable CSV persistence)
//! - `RepositoryManager` (load-or-rebuild lifecycle, queries, registration)
//! - `ProblemHandle` (domain/instance paths, visualizer references)
//!
//! Rendering is out of scope: visualizers are only named, through
//! `VisualizerRef`, and resolved by an external `VisualizerResolver`.
//!
//! ## Data model
//!
//! ```text
//! archive/<context>/<problem>/problem.toml  (scanned on rebuild)
//!     ↓  scan_archive
//! RepoIndex (by_name + by_context, discovery order)
//!     ↕  save / load
//! manifest.csv (one row per problem)
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod index;
pub mod lock;
pub mod manager;
pub mod manifest;
pub mod metadata;
pub mod record;
pub mod scanner;
pub mod visualizer;

pub use config::RepoConfig;
pub use error::{ErrorKind, RepoError, format_columns};
pub use handle::ProblemHandle;
pub use index::RepoIndex;
pub use lock::archive_lock_path;
pub use manager::{DomainRegistration, RepositoryManager};
pub use manifest::{
    HEADER, MANIFEST_FILE, ManifestError, read_manifest, read_manifest_from_path, write_manifest,
    write_manifest_to_path,
};
pub use metadata::{CONTEXT_MARKER_FILE, METADATA_FILE, MetadataError, ProblemMetadata};
pub use record::{
    DEFAULT_CONTEXT, DOMAIN_FILE, NO_VISUALIZER, ProblemRecord, VisualizerSpec, qualified_name,
};
pub use scanner::{CACHE_DIR, scan_archive};
pub use visualizer::{VisualizerRef, VisualizerResolver};
