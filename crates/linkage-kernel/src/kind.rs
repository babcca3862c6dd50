//! Link kinds and the kind registry.
//!
//! A link kind names one layer abstraction (a physical medium, a network
//! layer, an application protocol). Kinds are arranged in one or more named
//! ancestry graphs: for every kind, a graph records the ordered set of its
//! *direct parents*, the lower layers it may run on top of. A kind with no
//! parents is a root.
//!
//! The registry is populated once while the catalogue loads and is read-only
//! afterwards. Every algebra operation runs against a [`Lineage`], a cheap
//! borrowed view selecting one graph of a frozen registry.

use crate::error::LinkageError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Name of the graph used when configuration selects none.
pub const DEFAULT_GRAPH: &str = "";

/// Opaque identifier of a layer abstraction (`Ethernet`, `IPv4`, `Tcp`).
///
/// Cloning shares the interned name; kinds are compared by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKind(Arc<str>);

impl LinkKind {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Serialize for LinkKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LinkKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(name))
    }
}

/// Host-level settings carried by a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Graph selected when a caller does not name one explicitly.
    #[serde(default)]
    pub active_graph: String,

    /// Ceiling on the number of alternatives a single node may expand into
    /// during normalization or single-expansion. `None` disables it.
    #[serde(default)]
    pub max_alternatives: Option<usize>,
}

/// Per-graph mapping from a kind to its ordered direct parents.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    graphs: BTreeMap<String, BTreeMap<LinkKind, Vec<LinkKind>>>,
    settings: RegistrySettings,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            graphs: BTreeMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn set_active_graph(&mut self, graph: impl Into<String>) {
        self.settings.active_graph = graph.into();
    }

    pub fn set_max_alternatives(&mut self, limit: Option<usize>) {
        self.settings.max_alternatives = limit;
    }

    /// Declare (or replace) the direct parents of `kind` in `graph`.
    ///
    /// Parents may reference kinds that are declared later; unknown parents
    /// are only reported when a resolution walks through them. Duplicate
    /// parents are dropped, keeping the first occurrence.
    pub fn register<I, K>(&mut self, kind: impl Into<LinkKind>, graph: &str, parents: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<LinkKind>,
    {
        let mut seen = BTreeSet::new();
        let ordered: Vec<LinkKind> = parents
            .into_iter()
            .map(Into::into)
            .filter(|parent| seen.insert(parent.clone()))
            .collect();
        self.graphs
            .entry(graph.to_string())
            .or_default()
            .insert(kind.into(), ordered);
    }

    /// Direct parents of `kind` in `graph`; empty when undeclared.
    pub fn parents_of(&self, kind: &LinkKind, graph: &str) -> &[LinkKind] {
        self.graphs
            .get(graph)
            .and_then(|kinds| kinds.get(kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_declared(&self, kind: &LinkKind, graph: &str) -> bool {
        self.graphs
            .get(graph)
            .is_some_and(|kinds| kinds.contains_key(kind))
    }

    /// Direct parents of `kind`, failing when the kind or any of its parents
    /// is not declared in `graph`.
    pub fn declared_parents(
        &self,
        kind: &LinkKind,
        graph: &str,
    ) -> Result<&[LinkKind], LinkageError> {
        let Some(parents) = self.graphs.get(graph).and_then(|kinds| kinds.get(kind)) else {
            return Err(LinkageError::Configuration(format!(
                "kind `{kind}` is not declared in graph {graph:?}"
            )));
        };
        if let Some(unknown) = parents.iter().find(|p| !self.is_declared(p, graph)) {
            return Err(LinkageError::Configuration(format!(
                "kind `{kind}` names undeclared parent `{unknown}` in graph {graph:?}"
            )));
        }
        Ok(parents)
    }

    /// Whether `parent` is one of the direct parents of `child`.
    pub fn is_direct_parent(&self, parent: &LinkKind, child: &LinkKind, graph: &str) -> bool {
        self.parents_of(child, graph).contains(parent)
    }

    /// Whether `ancestor` is reachable from `descendant` through one or more
    /// direct-parent edges. Every declared parent is explored.
    pub fn is_ancestor(&self, ancestor: &LinkKind, descendant: &LinkKind, graph: &str) -> bool {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<&LinkKind> = self.parents_of(descendant, graph).iter().collect();
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.parents_of(current, graph));
            }
        }
        false
    }

    /// Transitive ancestors of `kind`, nearest first, without duplicates.
    pub fn ancestors_of(&self, kind: &LinkKind, graph: &str) -> Vec<LinkKind> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut frontier: Vec<&LinkKind> = self.parents_of(kind, graph).iter().collect();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                if seen.insert(current.clone()) {
                    out.push(current.clone());
                    next.extend(self.parents_of(current, graph));
                }
            }
            frontier = next;
        }
        out
    }

    /// Declared kinds of `graph` with their direct parents, sorted by name.
    pub fn kinds(&self, graph: &str) -> impl Iterator<Item = (&LinkKind, &[LinkKind])> {
        self.graphs
            .get(graph)
            .into_iter()
            .flat_map(|kinds| kinds.iter().map(|(k, p)| (k, p.as_slice())))
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    /// View over the configured active graph.
    pub fn lineage(&self) -> Lineage<'_> {
        self.lineage_for(&self.settings.active_graph)
    }

    /// View over an explicitly named graph.
    pub fn lineage_for<'r>(&'r self, graph: &'r str) -> Lineage<'r> {
        Lineage {
            registry: self,
            graph,
            max_alternatives: self.settings.max_alternatives,
        }
    }
}

/// A registry bound to one graph: the handle every algebra operation runs on.
///
/// Builder, resolution and comparison operations are implemented as methods
/// on this type in their own modules.
#[derive(Debug, Clone, Copy)]
pub struct Lineage<'r> {
    registry: &'r KindRegistry,
    graph: &'r str,
    max_alternatives: Option<usize>,
}

impl<'r> Lineage<'r> {
    pub fn registry(&self) -> &'r KindRegistry {
        self.registry
    }

    pub fn graph(&self) -> &'r str {
        self.graph
    }

    pub fn with_max_alternatives(self, limit: Option<usize>) -> Self {
        Self {
            max_alternatives: limit,
            ..self
        }
    }

    pub fn parents_of(&self, kind: &LinkKind) -> &'r [LinkKind] {
        self.registry.parents_of(kind, self.graph)
    }

    pub fn is_direct_parent(&self, parent: &LinkKind, child: &LinkKind) -> bool {
        self.registry.is_direct_parent(parent, child, self.graph)
    }

    pub fn is_ancestor(&self, ancestor: &LinkKind, descendant: &LinkKind) -> bool {
        self.registry.is_ancestor(ancestor, descendant, self.graph)
    }

    pub(crate) fn declared_parents(&self, kind: &LinkKind) -> Result<&'r [LinkKind], LinkageError> {
        self.registry.declared_parents(kind, self.graph)
    }

    /// Fail once `count` alternatives exceed the configured ceiling.
    pub(crate) fn check_budget(&self, count: usize) -> Result<(), LinkageError> {
        match self.max_alternatives {
            Some(limit) if count > limit => {
                tracing::warn!(graph = self.graph, limit, count, "expansion ceiling reached");
                Err(LinkageError::ExpansionLimit { limit })
            }
            _ => Ok(()),
        }
    }
}
