use thiserror::Error;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("owner id must not be empty")]
    EmptyOwnerId,

    #[error("record template reference must not be empty")]
    EmptyTemplate,

    #[error("manifest entry for {template} has zero count")]
    ZeroCount { template: String },

    #[error("manifest lists {template} more than once")]
    DuplicateTemplate { template: String },

    #[error("record {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: Box<TypeError>,
    },
}
