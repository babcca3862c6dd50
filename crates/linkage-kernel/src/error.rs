//! Error types for link-tree algebra operations.

use crate::kind::LinkKind;

/// Errors raised synchronously by the algebra at the call that violates a
/// precondition. Nothing is retried or recovered inside the kernel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkageError {
    /// A kind or tree was attached below a concrete kind it is not an
    /// ancestor of.
    #[error("illegal link type: `{attached}` is not an ancestor of `{kind}`")]
    IllegalLinkType { kind: LinkKind, attached: String },

    /// AND-of-OR nesting, or a container placed inside a conjunction.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// An operation was invoked on a tree that does not satisfy its shape
    /// requirements (unresolved, not single, missing endpoints).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Non-empty endpoint metadata would be overwritten by a different value.
    #[error("metadata conflict: endpoints already set to {current}, refusing {requested}")]
    MetadataConflict { current: String, requested: String },

    /// A kind (or one of its declared parents) is unknown to the active graph.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Normalization or single-expansion exceeded the configured ceiling.
    #[error("expansion limit exceeded: more than {limit} alternatives")]
    ExpansionLimit { limit: usize },
}

/// Which class of failure a [`LinkageError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    IllegalLinkType,
    InvalidExpression,
    Precondition,
    MetadataConflict,
    Configuration,
    ExpansionLimit,
}

impl LinkageError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::IllegalLinkType { .. } => ErrorClass::IllegalLinkType,
            Self::InvalidExpression(_) => ErrorClass::InvalidExpression,
            Self::Precondition(_) => ErrorClass::Precondition,
            Self::MetadataConflict { .. } => ErrorClass::MetadataConflict,
            Self::Configuration(_) => ErrorClass::Configuration,
            Self::ExpansionLimit { .. } => ErrorClass::ExpansionLimit,
        }
    }
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IllegalLinkType => "illegal_link_type",
            Self::InvalidExpression => "invalid_expression",
            Self::Precondition => "precondition",
            Self::MetadataConflict => "metadata_conflict",
            Self::Configuration => "configuration",
            Self::ExpansionLimit => "expansion_limit",
        }
    }
}
