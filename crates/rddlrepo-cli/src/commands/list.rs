use crate::cli::GlobalArgs;
use crate::support::{LIST_COLUMNS, fail, open_manager_or_exit, print_json, render_groups};
use rddlrepo_core::{RepoError, RepositoryManager};
use serde_json::json;

/// `(context, names)` pairs in discovery order, or just the one requested.
pub fn collect_groups(
    manager: &RepositoryManager,
    context: Option<&str>,
) -> Result<Vec<(String, Vec<String>)>, RepoError> {
    let contexts = match context {
        Some(context) => vec![context.to_string()],
        None => manager.list_contexts()?,
    };
    contexts
        .into_iter()
        .map(|context| {
            let names = manager.list_problems_by_context(&context)?;
            Ok((context, names))
        })
        .collect()
}

pub fn run(global: &GlobalArgs, context: Option<String>, json_output: bool) {
    let manager = open_manager_or_exit(global, false);
    let groups = collect_groups(&manager, context.as_deref()).unwrap_or_else(|e| fail(e));

    if json_output {
        let items = groups
            .iter()
            .map(|(context, names)| {
                json!({
                    "context": context,
                    "count": names.len(),
                    "problems": names,
                })
            })
            .collect::<Vec<_>>();
        let total: usize = groups.iter().map(|(_, names)| names.len()).sum();
        print_json(&json!({
            "action": "list",
            "archiveRoot": manager.archive_root().display().to_string(),
            "count": total,
            "contexts": items,
        }));
    } else {
        print!("{}", render_groups(&groups, LIST_COLUMNS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rddlrepo_core::{ErrorKind, METADATA_FILE, RepoConfig};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn problem(root: &Path, rel: &str, name: &str, context: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).expect("problem dir should be created");
        fs::write(
            dir.join(METADATA_FILE),
            format!(
                "name = \"{name}\"\ndescription = \"\"\ncontext = \"{context}\"\ntags = []\nviz = \"\"\n"
            ),
        )
        .expect("metadata should be written");
        fs::write(dir.join("domain.rddl"), "").expect("domain should be written");
    }

    fn manager() -> (TempDir, RepositoryManager) {
        let root = TempDir::new().expect("temp dir should exist");
        problem(root.path(), "comp2018/Bar", "Bar", "comp2018");
        problem(root.path(), "standalone/Foo", "Foo", "");
        let manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        (root, manager)
    }

    #[test]
    fn groups_follow_discovery_order() {
        let (_root, manager) = manager();
        let groups = collect_groups(&manager, None).expect("groups");
        assert_eq!(
            groups,
            vec![
                ("comp2018".to_string(), vec!["Bar_comp2018".to_string()]),
                ("standalone".to_string(), vec!["Foo".to_string()]),
            ]
        );
    }

    #[test]
    fn unknown_context_is_an_error() {
        let (_root, manager) = manager();
        let err = collect_groups(&manager, Some("gym")).expect_err("gym is not a context");
        assert_eq!(err.kind(), ErrorKind::ContextNotExist);
    }
}
