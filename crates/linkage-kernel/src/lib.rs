//! # Linkage Kernel
//!
//! The link-tree algebra: connection requirements built from link kinds,
//! resolved against a kind ancestry graph, and compared for compatibility.
//!
//! A requirement says which layers a connection must provide, for example
//! `Tcp > IPv4 > (Ethernet | WirelessLan)`. Kinds only name layers; what may
//! run on top of what is recorded in a [`KindRegistry`]. Every operation of
//! the algebra runs against a [`Lineage`], a view selecting one graph of a
//! frozen registry.
//!
//! ## Architecture
//!
//! ```text
//! KindRegistry          ← kind → ordered direct parents, per named graph
//!     │
//! Lineage               ← one graph of a frozen registry
//!     │
//! Expr / combine        ← AND/OR builder, reduced to an OR-set of groups
//!     │
//! normalize             ← fills in implicit layers, fans out alternatives
//!     │
//! expand_to_singles     ← OR-free realizations, cut into subtrees
//!     │
//! is_contained_in       ← containment, intersection, equality
//! ```
//!
//! The kernel is pure and synchronous. It performs no I/O and never mutates
//! a tree a caller still holds.

pub mod compare;
pub mod endpoint;
pub mod error;
pub mod expr;
pub mod kind;
pub mod resolve;
pub mod tree;

pub use endpoint::{DeviceRef, EndpointMetadata, metadata_matches};
pub use error::{ErrorClass, LinkageError};
pub use expr::Expr;
pub use kind::{DEFAULT_GRAPH, KindRegistry, Lineage, LinkKind, RegistrySettings};
pub use tree::{Branch, LinkTree};
