//! Linkage CLI: the `linkage` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Kinds { source } => commands::kinds::run(source),

        Commands::Ancestors { kind, source } => commands::ancestors::run(kind, source),

        Commands::Resolve {
            requirement,
            source,
        } => commands::resolve::run(requirement, source),

        Commands::Check {
            left,
            right,
            source,
        } => commands::check::run(left, right, source),
    }
}
