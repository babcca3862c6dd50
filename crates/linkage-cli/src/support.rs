use crate::cli::CatalogArgs;
use linkage_catalog::Catalog;
use linkage_kernel::LinkTree;
use serde_json::Value;
use std::fmt::Display;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LINKAGE_LOG";

/// Diagnostics go to stderr, filtered by `LINKAGE_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn load_catalog_or_exit(source: &CatalogArgs) -> Catalog {
    let mut catalog = or_exit(Catalog::load(&source.catalog));
    if let Some(graph) = &source.graph {
        or_exit(catalog.select_graph(graph));
        tracing::debug!(graph = %graph, "graph selected");
    }
    catalog
}

pub fn parse_requirement_or_exit(catalog: &Catalog, text: &str) -> LinkTree {
    or_exit(catalog.parse(text))
}

/// `(default)` for the unnamed graph.
pub fn graph_label(graph: &str) -> &str {
    if graph.is_empty() { "(default)" } else { graph }
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

pub fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        println!("  {label}: none");
        return;
    }
    println!("  {label}:");
    for item in items {
        println!("    - {item}");
    }
}
