use crate::cli::GlobalArgs;
use crate::support::{fail, open_manager_or_exit, print_json};
use serde_json::json;

pub fn run(global: &GlobalArgs, context: String, json_output: bool) {
    let mut manager = open_manager_or_exit(global, false);
    let dir = manager
        .register_context(&context)
        .unwrap_or_else(|e| fail(e));

    if json_output {
        print_json(&json!({
            "action": "register-context",
            "context": context,
            "path": dir.display().to_string(),
        }));
    } else {
        println!("Registered context <{context}> at {}", dir.display());
    }
}
