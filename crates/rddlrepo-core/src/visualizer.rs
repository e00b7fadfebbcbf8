//! Visualizer references.
//!
//! The archive only names visualizers. Loading and rendering belong to an
//! external [`VisualizerResolver`]; nothing here imports or runs one.

use crate::error::RepoError;
use crate::record::VisualizerSpec;
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path};

/// Fully qualified locator of a problem's visualizer class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VisualizerRef {
    /// Dotted module path, ending with the declared module.
    pub module: String,
    pub class: String,
}

impl VisualizerRef {
    /// Locate `spec` for a problem folder inside `archive_root`.
    ///
    /// The module path is `[namespace.]<root dir>.<folder segments>.<module>`.
    /// Returns `Ok(None)` when no visualizer is declared.
    pub fn locate(
        spec: &VisualizerSpec,
        location: &Path,
        archive_root: &Path,
        namespace: Option<&str>,
    ) -> Result<Option<Self>, RepoError> {
        let VisualizerSpec::Declared { module, class } = spec else {
            return Ok(None);
        };

        let relative = location.strip_prefix(archive_root).map_err(|_| {
            RepoError::invalid(
                "problem location",
                &location.display().to_string(),
                format!("not inside archive root {}", archive_root.display()),
            )
        })?;

        let mut segments: Vec<String> = Vec::new();
        if let Some(namespace) = namespace.filter(|n| !n.is_empty()) {
            segments.push(namespace.to_string());
        }
        if let Some(root_name) = archive_root.file_name() {
            segments.push(root_name.to_string_lossy().into_owned());
        }
        for component in relative.components() {
            if let Component::Normal(part) = component {
                segments.push(part.to_string_lossy().into_owned());
            }
        }
        segments.push(module.clone());

        Ok(Some(Self {
            module: segments.join("."),
            class: class.clone(),
        }))
    }
}

impl fmt::Display for VisualizerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.class)
    }
}

/// Loads a renderable visualizer from a reference.
///
/// Implementations report a missing rendering backend as
/// [`RepoError::UnresolvedDependency`].
pub trait VisualizerResolver {
    type Handle;

    fn resolve(&self, reference: &VisualizerRef) -> Result<Self::Handle, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    fn declared() -> VisualizerSpec {
        VisualizerSpec::parse("CartPoleViz.CartPoleVisualizer").unwrap()
    }

    #[test]
    fn locate_joins_folder_segments() {
        let reference = VisualizerRef::locate(
            &declared(),
            &PathBuf::from("/repo/archive/gym/CartPole/Discrete"),
            &PathBuf::from("/repo/archive"),
            Some("rddlrepository"),
        )
        .unwrap()
        .expect("visualizer should be declared");
        assert_eq!(
            reference.to_string(),
            "rddlrepository.archive.gym.CartPole.Discrete.CartPoleViz.CartPoleVisualizer"
        );
        assert_eq!(reference.class, "CartPoleVisualizer");
    }

    #[test]
    fn locate_without_visualizer_is_none() {
        let reference = VisualizerRef::locate(
            &VisualizerSpec::None,
            &PathBuf::from("/repo/archive/gym/CartPole"),
            &PathBuf::from("/repo/archive"),
            None,
        )
        .unwrap();
        assert!(reference.is_none());
    }

    #[test]
    fn locate_outside_root_is_rejected() {
        let err = VisualizerRef::locate(
            &declared(),
            &PathBuf::from("/elsewhere/CartPole"),
            &PathBuf::from("/repo/archive"),
            None,
        )
        .expect_err("foreign location should fail");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    struct MissingBackend;

    impl VisualizerResolver for MissingBackend {
        type Handle = ();

        fn resolve(&self, reference: &VisualizerRef) -> Result<(), RepoError> {
            Err(RepoError::UnresolvedDependency {
                backend: "plotting".to_string(),
                detail: format!("cannot load {reference}"),
            })
        }
    }

    #[test]
    fn resolvers_report_missing_backends() {
        let reference = VisualizerRef {
            module: "archive.gym.CartPole.CartPoleViz".to_string(),
            class: "CartPoleVisualizer".to_string(),
        };
        let err = MissingBackend.resolve(&reference).expect_err("backend is absent");
        assert_eq!(err.kind(), ErrorKind::UnresolvedDependency);
    }
}
