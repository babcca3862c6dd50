use crate::notation::NotationError;
use linkage_kernel::LinkageError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid requirement `{text}`: {source}")]
    Notation {
        text: String,
        #[source]
        source: NotationError,
    },

    #[error("unknown graph {0:?}")]
    UnknownGraph(String),

    #[error("unknown requirement `{0}`")]
    UnknownRequirement(String),

    #[error(transparent)]
    Linkage(#[from] LinkageError),
}
