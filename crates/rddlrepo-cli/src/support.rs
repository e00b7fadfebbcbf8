use crate::cli::GlobalArgs;
use rddlrepo_core::{MANIFEST_FILE, RepoConfig, RepoError, RepositoryManager, format_columns};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_ARCHIVE: &str = "archive";
pub const LIST_COLUMNS: usize = 3;

/// Flags override the config file, which overrides the defaults.
///
/// `--archive` moves the manifest along with it unless the manifest was set
/// explicitly, by flag or by the config file.
pub fn resolve_config(global: &GlobalArgs) -> Result<RepoConfig, RepoError> {
    let mut config = match &global.config {
        Some(path) => RepoConfig::from_toml_path(path)?,
        None => RepoConfig::new(DEFAULT_ARCHIVE),
    };

    if let Some(archive) = &global.archive {
        let manifest_follows_archive =
            config.manifest_path == config.archive_root.join(MANIFEST_FILE);
        config.archive_root = PathBuf::from(archive);
        if manifest_follows_archive {
            config.manifest_path = config.archive_root.join(MANIFEST_FILE);
        }
    }
    if let Some(manifest) = &global.manifest {
        config.manifest_path = PathBuf::from(manifest);
    }
    Ok(config)
}

pub fn open_manager_or_exit(global: &GlobalArgs, rebuild: bool) -> RepositoryManager {
    let config = resolve_config(global).unwrap_or_else(|e| fail(e));
    tracing::debug!(
        archive = %config.archive_root.display(),
        manifest = %config.manifest_path.display(),
        rebuild,
        "resolved repository config"
    );
    RepositoryManager::open(config.with_rebuild(rebuild)).unwrap_or_else(|e| fail(e))
}

pub fn read_text_or_exit(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(format!("failed to read {path}: {e}")))
}

pub fn fail(err: impl fmt::Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

/// One block per context: a header line, then names in padded columns.
pub fn render_groups(groups: &[(String, Vec<String>)], cols: usize) -> String {
    let mut out = String::new();
    for (context, names) in groups {
        out.push_str(&format!("{context} ({}):\n", names.len()));
        for line in format_columns(names, cols).lines() {
            out.push_str("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn defaults_apply_without_flags() {
        let config = resolve_config(&GlobalArgs::default()).expect("defaults resolve");
        assert_eq!(config.archive_root, PathBuf::from("archive"));
        assert_eq!(config.manifest_path, PathBuf::from("archive/manifest.csv"));
    }

    #[test]
    fn archive_flag_moves_default_manifest() {
        let global = GlobalArgs {
            archive: Some("/data/rddl".to_string()),
            ..GlobalArgs::default()
        };
        let config = resolve_config(&global).expect("flags resolve");
        assert_eq!(config.manifest_path, PathBuf::from("/data/rddl/manifest.csv"));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new().expect("temp dir should exist");
        let path = dir.path().join("rddlrepo.toml");
        fs::write(
            &path,
            "archive_root = \"archive\"\nmanifest_path = \"index/manifest.csv\"\n",
        )
        .expect("config should be written");

        let global = GlobalArgs {
            archive: Some("/elsewhere".to_string()),
            config: Some(path.display().to_string()),
            ..GlobalArgs::default()
        };
        let config = resolve_config(&global).expect("config resolves");
        assert_eq!(config.archive_root, PathBuf::from("/elsewhere"));
        assert_eq!(config.manifest_path, dir.path().join("index/manifest.csv"));

        let global = GlobalArgs {
            manifest: Some("/tmp/m.csv".to_string()),
            ..global
        };
        let config = resolve_config(&global).expect("config resolves");
        assert_eq!(config.manifest_path, PathBuf::from("/tmp/m.csv"));
    }

    #[test]
    fn groups_render_as_indented_columns() {
        let groups = vec![
            (
                "standalone".to_string(),
                names(&["Foo", "LongerName", "Baz", "Qux"]),
            ),
            ("comp2018".to_string(), names(&["Bar_comp2018"])),
            ("empty".to_string(), Vec::new()),
        ];
        insta::assert_snapshot!(render_groups(&groups, 3), @r"
        standalone (4):
          Foo        LongerName Baz
          Qux
        comp2018 (1):
          Bar_comp2018
        empty (0):
        ");
    }
}
