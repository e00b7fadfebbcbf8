use crate::cli::GlobalArgs;
use crate::support::{fail, open_manager_or_exit, print_json, read_text_or_exit};
use rddlrepo_core::DomainRegistration;
use serde_json::json;

pub struct Args {
    pub name: String,
    pub context: String,
    pub rddl: String,
    pub description: Option<String>,
    pub viz: Option<String>,
    pub json: bool,
}

/// `rddl` is the domain text, already read from `args.rddl`.
pub fn registration(args: &Args, rddl: String) -> DomainRegistration {
    let mut registration = DomainRegistration::new(&args.name, &args.context, rddl);
    if let Some(description) = &args.description {
        registration = registration.with_description(description);
    }
    if let Some(viz) = &args.viz {
        registration = registration.with_viz(viz);
    }
    registration
}

pub fn run(global: &GlobalArgs, args: Args) {
    let rddl = read_text_or_exit(&args.rddl);
    let mut manager = open_manager_or_exit(global, false);
    let name = manager
        .register_domain(registration(&args, rddl))
        .unwrap_or_else(|e| fail(e));
    let problem = manager.get_problem(&name).unwrap_or_else(|e| fail(e));

    if args.json {
        print_json(&json!({
            "action": "register-domain",
            "name": name,
            "context": problem.context(),
            "location": problem.location().display().to_string(),
            "domainPath": problem.get_domain().display().to_string(),
        }));
    } else {
        println!(
            "Registered domain {name} in context <{}> at {}",
            problem.context(),
            problem.location().display()
        );
    }
}
