use crate::cli::CatalogArgs;
use crate::support::{graph_label, load_catalog_or_exit, print_json, print_list};
use linkage_kernel::LinkKind;
use serde_json::json;

pub fn run(kind: String, source: CatalogArgs) {
    let catalog = load_catalog_or_exit(&source);
    let graph = catalog.lineage().graph();
    let kind = LinkKind::new(kind);
    if !catalog.registry().is_declared(&kind, graph) {
        eprintln!("error: kind `{kind}` is not declared in graph {graph:?}");
        std::process::exit(1);
    }
    let ancestors = catalog.registry().ancestors_of(&kind, graph);

    if source.json {
        print_json(&json!({
            "graph": graph,
            "kind": kind,
            "ancestors": ancestors,
        }));
        return;
    }

    println!("linkage ancestors {kind} --graph {}", graph_label(graph));
    let names: Vec<String> = ancestors.iter().map(ToString::to_string).collect();
    print_list("Ancestors", &names);
}
