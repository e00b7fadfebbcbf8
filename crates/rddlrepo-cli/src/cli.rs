use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rddlrepo",
    about = "rddlrepo: catalog, query, and extend an archive of RDDL problems",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Archive root directory (default: ./archive)
    #[arg(long, global = true)]
    pub archive: Option<String>,

    /// Manifest file (default: <archive>/manifest.csv)
    #[arg(long, global = true)]
    pub manifest: Option<String>,

    /// TOML config file providing archive_root, manifest_path, viz_namespace
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log archive scans and manifest traffic at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rescan the archive and rewrite the manifest
    Build {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List problems grouped by context
    List {
        /// Only list problems in this context
        #[arg(long)]
        context: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one problem: metadata, files, visualizer reference
    Show {
        /// Qualified problem name (e.g. `Wildfire_ippc2014`)
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an empty context directory in the archive
    RegisterContext {
        /// Context name (a single directory name)
        context: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new domain folder to an existing context
    RegisterDomain {
        /// Base name of the domain
        name: String,

        /// Context the domain is filed under
        #[arg(long)]
        context: String,

        /// File holding the domain's RDDL text
        #[arg(long)]
        rddl: String,

        /// Description (default: generated from name, context, and time)
        #[arg(long)]
        description: Option<String>,

        /// Visualizer as `<Module>.<ClassName>`
        #[arg(long)]
        viz: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an instance file to a registered problem
    RegisterInstance {
        /// Qualified problem name
        problem: String,

        /// Numeric instance id
        id: String,

        /// File holding the instance's RDDL text
        #[arg(long)]
        rddl: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
