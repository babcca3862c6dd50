use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "linkage",
    about = "Linkage: resolve and compare connection requirements over a link-kind catalogue",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Path to the catalogue TOML
    #[arg(long, default_value = "linkage.toml")]
    pub catalog: String,

    /// Ancestry graph to use instead of `settings.active_graph`
    #[arg(long)]
    pub graph: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the kinds of the active graph with their direct parents
    Kinds {
        #[command(flatten)]
        source: CatalogArgs,
    },

    /// Show the transitive ancestors of a kind, nearest first
    Ancestors {
        /// Kind name
        kind: String,

        #[command(flatten)]
        source: CatalogArgs,
    },

    /// Normalize a requirement and list its single realizations
    Resolve {
        /// Requirement in notation form, or `@name` from `[requirements]`
        requirement: String,

        #[command(flatten)]
        source: CatalogArgs,
    },

    /// Compare two requirements: containment, equality and intersection
    Check {
        /// Left requirement (notation or `@name`)
        left: String,

        /// Right requirement (notation or `@name`)
        right: String,

        #[command(flatten)]
        source: CatalogArgs,
    },
}
