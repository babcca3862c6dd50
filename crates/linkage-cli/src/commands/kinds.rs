use crate::cli::CatalogArgs;
use crate::support::{graph_label, load_catalog_or_exit, print_json};
use serde_json::json;

pub fn run(source: CatalogArgs) {
    let catalog = load_catalog_or_exit(&source);
    let lineage = catalog.lineage();
    let kinds: Vec<_> = catalog.registry().kinds(lineage.graph()).collect();

    if source.json {
        let entries: Vec<_> = kinds
            .iter()
            .map(|(kind, parents)| json!({ "kind": kind, "parents": parents }))
            .collect();
        print_json(&json!({
            "catalog": source.catalog,
            "graph": lineage.graph(),
            "kinds": entries,
        }));
        return;
    }

    println!("linkage kinds --graph {}", graph_label(lineage.graph()));
    println!("  Source: {}", source.catalog);
    println!("  Kinds: {}", kinds.len());
    for (kind, parents) in kinds {
        if parents.is_empty() {
            println!("    {kind} (root)");
        } else {
            let names: Vec<&str> = parents.iter().map(|p| p.name()).collect();
            println!("    {kind} <- {}", names.join(", "));
        }
    }
}
