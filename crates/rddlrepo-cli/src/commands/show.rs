use crate::cli::GlobalArgs;
use crate::support::{fail, open_manager_or_exit, print_json};
use rddlrepo_core::{ProblemHandle, RepoError, VisualizerRef};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPayload {
    pub action: &'static str,
    pub name: String,
    pub description: String,
    pub context: String,
    pub location: String,
    pub domain_path: String,
    pub instances: Vec<String>,
    pub instance_paths: Vec<String>,
    pub tags: Vec<String>,
    pub visualizer: Option<VisualizerRef>,
}

pub fn build_payload(problem: &ProblemHandle) -> Result<ShowPayload, RepoError> {
    let instance_paths = problem
        .list_instances()
        .iter()
        .map(|id| {
            problem
                .get_instance(id)
                .map(|path| path.display().to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ShowPayload {
        action: "show",
        name: problem.name().to_string(),
        description: problem.description().to_string(),
        context: problem.context().to_string(),
        location: problem.location().display().to_string(),
        domain_path: problem.get_domain().display().to_string(),
        instances: problem.list_instances().to_vec(),
        instance_paths,
        tags: problem.tags().to_vec(),
        visualizer: problem.get_visualizer()?,
    })
}

pub fn run(global: &GlobalArgs, name: String, json_output: bool) {
    let manager = open_manager_or_exit(global, false);
    let problem = manager.get_problem(&name).unwrap_or_else(|e| fail(e));
    let payload = build_payload(&problem).unwrap_or_else(|e| fail(e));

    if json_output {
        let value = serde_json::to_value(&payload).unwrap_or_else(|e| fail(e));
        print_json(&value);
    } else {
        println!("{problem}");
        println!("domain: {}", payload.domain_path);
        if let Some(visualizer) = &payload.visualizer {
            println!("visualizer: {visualizer}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rddlrepo_core::{METADATA_FILE, RepoConfig, RepositoryManager};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn payload_lists_instance_paths_and_visualizer() {
        let root = TempDir::new().expect("temp dir should exist");
        let dir = root.path().join("gym/CartPole");
        fs::create_dir_all(&dir).expect("problem dir should be created");
        fs::write(
            dir.join(METADATA_FILE),
            "name = \"CartPole\"\ndescription = \"Cart pole\"\ncontext = \"gym\"\n\
             tags = \"classic,control\"\nviz = \"CartPoleViz.CartPoleVisualizer\"\n",
        )
        .expect("metadata should be written");
        for file in ["domain.rddl", "instance0.rddl", "instance1.rddl"] {
            fs::write(dir.join(file), "").expect("rddl file should be written");
        }

        let manager = RepositoryManager::open(RepoConfig::new(root.path())).expect("open");
        let problem = manager.get_problem("CartPole_gym").expect("problem exists");
        let payload = build_payload(&problem).expect("payload");

        assert_eq!(payload.instances, vec!["0", "1"]);
        assert!(payload.instance_paths[1].ends_with("instance1.rddl"));
        assert_eq!(payload.tags, vec!["classic", "control"]);
        let visualizer = payload.visualizer.expect("visualizer declared");
        assert!(visualizer.module.ends_with(".gym.CartPole.CartPoleViz"));
        assert_eq!(visualizer.class, "CartPoleVisualizer");
    }
}
