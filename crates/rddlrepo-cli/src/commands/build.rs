use crate::cli::GlobalArgs;
use crate::support::{open_manager_or_exit, print_json};
use rddlrepo_core::RepositoryManager;
use serde_json::json;

pub fn summary_line(problems: usize, contexts: usize) -> String {
    format!(
        "Successfully built rddlrepository manifest: found {problems} problems across {contexts} contexts."
    )
}

pub fn run(global: &GlobalArgs, json_output: bool) {
    let manager = open_manager_or_exit(global, true);
    report(&manager, json_output);
}

fn report(manager: &RepositoryManager, json_output: bool) {
    let index = manager.index();
    if json_output {
        print_json(&json!({
            "action": "build",
            "archiveRoot": manager.archive_root().display().to_string(),
            "manifestPath": manager.manifest_path().display().to_string(),
            "problems": index.len(),
            "contexts": index.context_count(),
        }));
    } else {
        println!("{}", summary_line(index.len(), index.context_count()));
    }
}
