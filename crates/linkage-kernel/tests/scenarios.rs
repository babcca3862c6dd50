//! Integration tests: the reference layering scenarios.
//!
//! Each scenario builds a small ancestry graph, composes requirements through
//! the public builder API and checks the resolution and comparison results.

use linkage_kernel::{DEFAULT_GRAPH, KindRegistry, LinkKind, LinkTree, LinkageError};

fn k(name: &str) -> LinkKind {
    LinkKind::new(name)
}

fn registry(ipv4_parents: &[&str]) -> KindRegistry {
    let mut reg = KindRegistry::new();
    for root in ["OpticalFiber", "WirelessLan", "Usb"] {
        reg.register(root, DEFAULT_GRAPH, Vec::<LinkKind>::new());
    }
    reg.register("Ethernet", DEFAULT_GRAPH, ["OpticalFiber"]);
    reg.register("IPv4", DEFAULT_GRAPH, ipv4_parents.iter().copied());
    reg
}

#[test]
fn scenario_direct_and_indirect_parents() {
    let reg = registry(&["Ethernet"]);
    let lineage = reg.lineage();

    let direct = lineage.combine(&LinkTree::new("IPv4"), k("Ethernet")).unwrap();
    assert!(lineage.is_resolved(&direct));
    assert!(lineage.is_single(&direct));

    let skipped = lineage
        .combine(&LinkTree::new("IPv4"), k("OpticalFiber"))
        .unwrap();
    assert!(!lineage.is_resolved(&skipped));

    let spelled_out = lineage
        .combine(
            &LinkTree::new("IPv4"),
            lineage
                .combine(&LinkTree::new("Ethernet"), k("OpticalFiber"))
                .unwrap(),
        )
        .unwrap();
    assert!(lineage.equals(&skipped, &spelled_out, false).unwrap());
    assert_eq!(
        lineage.normalize(&skipped).unwrap().to_string(),
        "IPv4 > Ethernet > OpticalFiber"
    );
}

#[test]
fn scenario_alternative_lower_layers() {
    let reg = registry(&["Ethernet", "WirelessLan"]);
    let lineage = reg.lineage();

    let either = lineage
        .combine(&LinkTree::new("IPv4"), k("Ethernet") | k("WirelessLan"))
        .unwrap();
    let wired = lineage.combine(&LinkTree::new("IPv4"), k("Ethernet")).unwrap();
    let wireless = lineage
        .combine(&LinkTree::new("IPv4"), k("WirelessLan"))
        .unwrap();

    assert!(lineage.is_contained_in(&wired, &either, true).unwrap());
    assert!(lineage.is_contained_in(&wireless, &either, true).unwrap());

    let common = lineage.intersect(&either, &wired).unwrap().unwrap();
    assert!(lineage.equals(&common, &wired, true).unwrap());
    assert_eq!(common.to_string(), "IPv4 > Ethernet");
}

#[test]
fn scenario_conjunction_versus_disjunction() {
    let reg = registry(&["Ethernet"]);
    let lineage = reg.lineage();

    let three = lineage
        .build(k("Ethernet") & k("WirelessLan") & k("Usb"))
        .unwrap();
    let two = lineage.build(k("Ethernet") & k("WirelessLan")).unwrap();
    let any = lineage
        .build(k("Ethernet") | k("WirelessLan") | k("Usb"))
        .unwrap();

    assert!(lineage.is_contained_in(&two, &three, true).unwrap());
    assert!(!lineage.is_contained_in(&three, &two, true).unwrap());
    assert!(!lineage.is_contained_in(&two, &any, true).unwrap());
}

#[test]
fn scenario_unrelated_kinds_are_rejected() {
    let reg = registry(&["Ethernet"]);
    let err = LinkTree::new("Usb")
        .combine_with(&reg.lineage(), k("WirelessLan"))
        .unwrap_err();
    assert!(matches!(err, LinkageError::IllegalLinkType { .. }));
    assert_eq!(err.class().as_str(), "illegal_link_type");
}

#[test]
fn graphs_are_independent() {
    let mut reg = registry(&["Ethernet"]);
    reg.register("IPv4", "lab", ["WirelessLan"]);
    reg.register("WirelessLan", "lab", Vec::<LinkKind>::new());

    let default = reg.lineage();
    let lab = reg.lineage_for("lab");
    assert!(
        LinkTree::new("IPv4")
            .combine_with(&default, k("WirelessLan"))
            .is_err()
    );
    let wireless = LinkTree::new("IPv4")
        .combine_with(&lab, k("WirelessLan"))
        .unwrap();
    assert!(lab.is_single(&wireless));
    assert!(!default.is_resolved(&wireless));
}
