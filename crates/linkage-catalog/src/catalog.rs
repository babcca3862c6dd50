//! TOML catalogue of link kinds, graphs and named requirements.
//!
//! ```toml
//! [settings]
//! active_graph = ""
//! max_alternatives = 4096
//!
//! [kinds]
//! OpticalFiber = []
//! Ethernet = ["OpticalFiber"]
//!
//! [graphs.lab.kinds]
//! Ethernet = ["Coax"]
//!
//! [requirements]
//! uplink = "Ethernet > OpticalFiber"
//! ```
//!
//! `[kinds]` declares the default graph. Loading populates a
//! [`KindRegistry`] once; it is never modified afterwards except for the
//! graph selection.

use crate::error::CatalogError;
use crate::notation::Notation;
use linkage_kernel::{DEFAULT_GRAPH, KindRegistry, Lineage, LinkKind, LinkTree, RegistrySettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub settings: RegistrySettings,
    #[serde(default)]
    pub kinds: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub graphs: BTreeMap<String, GraphSection>,
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphSection {
    #[serde(default)]
    pub kinds: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    registry: KindRegistry,
    requirements: BTreeMap<String, Notation>,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
            path: display_path(path),
            source,
        })?;
        let catalog = Self::from_toml_str(&text, &display_path(path))?;
        tracing::debug!(path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    /// Parse catalogue text; `origin` names it in error messages.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text).map_err(|source| CatalogError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut registry = KindRegistry::with_settings(file.settings);
        declare(&mut registry, DEFAULT_GRAPH, file.kinds);
        for (graph, section) in file.graphs {
            declare(&mut registry, &graph, section.kinds);
        }
        for graph in registry.graph_names() {
            for (kind, parents) in registry.kinds(graph) {
                for parent in parents {
                    if !registry.is_declared(parent, graph) {
                        tracing::warn!(graph, %kind, %parent, "parent kind is never declared");
                    }
                }
            }
        }

        let mut requirements = BTreeMap::new();
        for (name, text) in file.requirements {
            let notation =
                Notation::parse(&text).map_err(|source| CatalogError::Notation { text, source })?;
            requirements.insert(name, notation);
        }

        let mut catalog = Self {
            registry,
            requirements,
        };
        let active = catalog.registry.settings().active_graph.clone();
        catalog.select_graph(&active)?;
        Ok(catalog)
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn lineage(&self) -> Lineage<'_> {
        self.registry.lineage()
    }

    /// Make `graph` the active one. The default graph is always selectable.
    pub fn select_graph(&mut self, graph: &str) -> Result<(), CatalogError> {
        if graph != DEFAULT_GRAPH && !self.registry.graph_names().any(|name| name == graph) {
            return Err(CatalogError::UnknownGraph(graph.to_string()));
        }
        self.registry.set_active_graph(graph);
        Ok(())
    }

    pub fn requirement_names(&self) -> impl Iterator<Item = &str> {
        self.requirements.keys().map(String::as_str)
    }

    /// Named requirement, built against the active graph.
    pub fn requirement(&self, name: &str) -> Result<LinkTree, CatalogError> {
        let notation = self
            .requirements
            .get(name)
            .ok_or_else(|| CatalogError::UnknownRequirement(name.to_string()))?;
        Ok(notation.lower(&self.lineage())?)
    }

    /// `@name` for a named requirement, anything else as notation.
    pub fn parse(&self, text: &str) -> Result<LinkTree, CatalogError> {
        if let Some(name) = text.trim().strip_prefix('@') {
            return self.requirement(name);
        }
        let notation = Notation::parse(text).map_err(|source| CatalogError::Notation {
            text: text.to_string(),
            source,
        })?;
        Ok(notation.lower(&self.lineage())?)
    }
}

fn declare(registry: &mut KindRegistry, graph: &str, kinds: BTreeMap<String, Vec<String>>) {
    for (kind, parents) in kinds {
        registry.register(LinkKind::new(kind), graph, parents.iter().map(LinkKind::new));
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
