use crate::cli::CatalogArgs;
use crate::support::{
    graph_label, load_catalog_or_exit, or_exit, parse_requirement_or_exit, print_json, print_list,
};
use serde_json::json;

pub fn run(requirement: String, source: CatalogArgs) {
    let catalog = load_catalog_or_exit(&source);
    let lineage = catalog.lineage();
    let tree = parse_requirement_or_exit(&catalog, &requirement);

    let resolved_before = lineage.is_resolved(&tree);
    let normalized = or_exit(lineage.normalize(&tree));
    let singles = or_exit(lineage.expand_to_singles(&normalized));
    let single_names: Vec<String> = singles.iter().map(ToString::to_string).collect();

    if source.json {
        print_json(&json!({
            "graph": lineage.graph(),
            "requirement": requirement,
            "tree": tree.to_string(),
            "resolved": resolved_before,
            "single": lineage.is_single(&tree),
            "normalized": normalized.to_string(),
            "singles": single_names,
            "normalized_tree": normalized,
        }));
        return;
    }

    println!("linkage resolve --graph {}", graph_label(lineage.graph()));
    println!("  Requirement: {tree}");
    println!("  Resolved: {}", if resolved_before { "yes" } else { "no" });
    println!("  Normalized: {normalized}");
    print_list("Singles", &single_names);
}
