use crate::cli::GlobalArgs;
use crate::support::{fail, open_manager_or_exit, print_json, read_text_or_exit};
use serde_json::json;

pub fn run(global: &GlobalArgs, problem: String, id: String, rddl: String, json_output: bool) {
    let text = read_text_or_exit(&rddl);
    let mut manager = open_manager_or_exit(global, false);
    let mut handle = manager.get_problem(&problem).unwrap_or_else(|e| fail(e));
    let path = handle
        .register_instance(&id, &text)
        .unwrap_or_else(|e| fail(e));
    // Pick up the new file so the manifest lists it for later invocations.
    manager.rebuild().unwrap_or_else(|e| fail(e));

    if json_output {
        print_json(&json!({
            "action": "register-instance",
            "problem": problem,
            "instance": id,
            "path": path.display().to_string(),
            "instances": handle.list_instances(),
        }));
    } else {
        println!(
            "Registered instance {id} of {problem} at {}",
            path.display()
        );
    }
}
