//! rddlrepo CLI: the `rddlrepo` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    install_tracing(cli.global.verbose);
    let global = cli.global;

    match cli.command {
        Commands::Build { json } => commands::build::run(&global, json),

        Commands::List { context, json } => commands::list::run(&global, context, json),

        Commands::Show { name, json } => commands::show::run(&global, name, json),

        Commands::RegisterContext { context, json } => {
            commands::register_context::run(&global, context, json)
        }

        Commands::RegisterDomain {
            name,
            context,
            rddl,
            description,
            viz,
            json,
        } => commands::register_domain::run(
            &global,
            commands::register_domain::Args {
                name,
                context,
                rddl,
                description,
                viz,
                json,
            },
        ),

        Commands::RegisterInstance {
            problem,
            id,
            rddl,
            json,
        } => commands::register_instance::run(&global, problem, id, rddl, json),
    }
}

/// Logs go to stderr so `--json` output stays clean.
fn install_tracing(verbose: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        for directive in ["rddlrepo_core=debug", "rddlrepo=debug"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
