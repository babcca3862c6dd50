use crate::cli::CatalogArgs;
use crate::support::{graph_label, load_catalog_or_exit, or_exit, parse_requirement_or_exit, print_json};
use serde_json::json;

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn run(left: String, right: String, source: CatalogArgs) {
    let catalog = load_catalog_or_exit(&source);
    let lineage = catalog.lineage();
    let left_tree = or_exit(lineage.normalize(&parse_requirement_or_exit(&catalog, &left)));
    let right_tree = or_exit(lineage.normalize(&parse_requirement_or_exit(&catalog, &right)));

    let left_in_right = or_exit(lineage.is_contained_in(&left_tree, &right_tree, false));
    let right_in_left = or_exit(lineage.is_contained_in(&right_tree, &left_tree, false));
    let equal = or_exit(lineage.equals(&left_tree, &right_tree, false));
    let common = or_exit(lineage.intersect(&left_tree, &right_tree));
    tracing::debug!(left_in_right, right_in_left, equal, "compared");

    if source.json {
        print_json(&json!({
            "graph": lineage.graph(),
            "left": left_tree.to_string(),
            "right": right_tree.to_string(),
            "left_in_right": left_in_right,
            "right_in_left": right_in_left,
            "equal": equal,
            "intersection": common.as_ref().map(ToString::to_string),
        }));
        return;
    }

    println!("linkage check --graph {}", graph_label(lineage.graph()));
    println!("  Left: {left_tree}");
    println!("  Right: {right_tree}");
    println!("  Left within right: {}", yes_no(left_in_right));
    println!("  Right within left: {}", yes_no(right_in_left));
    println!("  Equal: {}", yes_no(equal));
    match common {
        Some(tree) => println!("  Intersection: {tree}"),
        None => println!("  Intersection: none"),
    }
}
