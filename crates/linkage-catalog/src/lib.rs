//! Catalogue loading for the Linkage kernel.
//!
//! Reads link kinds, their ancestry graphs and named requirements from a
//! TOML file into a [`linkage_kernel::KindRegistry`], and parses the textual
//! requirement notation into kernel trees.

pub mod catalog;
pub mod error;
pub mod notation;

pub use catalog::{Catalog, CatalogFile, GraphSection};
pub use error::CatalogError;
pub use notation::{Notation, NotationError};
