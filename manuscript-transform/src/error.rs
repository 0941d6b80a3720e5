//! Error types for schema validation, format operations and migration

use crate::schema::NodeKind;
use semver::Version;
use thiserror::Error;

/// A node's children do not satisfy its kind's content grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid content for `{kind}`: {reason}")]
pub struct ContentModelViolation {
    pub kind: NodeKind,
    pub children: Vec<NodeKind>,
    pub reason: String,
}

/// Errors raised while building or validating a tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error(transparent)]
    ContentModel(#[from] ContentModelViolation),
    #[error("unknown node kind `{0}`")]
    UnknownKind(String),
    #[error("unknown mark `{0}`")]
    UnknownMark(String),
    #[error("text nodes must not be empty")]
    EmptyText,
    #[error("`{0}` nodes cannot carry text")]
    UnexpectedText(NodeKind),
    #[error("text nodes must carry text")]
    MissingText,
    #[error("tree nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Errors produced by the migration engine and its registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MigrationError {
    /// The migrated document does not validate against the current schema.
    #[error("document migrated from {from_version} failed validation: {source}")]
    ValidationFailure {
        from_version: Version,
        #[source]
        source: SchemaError,
    },
    #[error("invalid schema version `{0}`")]
    InvalidVersion(String),
    #[error("migration {from} -> {to} is registered more than once")]
    DuplicateRange { from: Version, to: Version },
    #[error("migration {from} -> {to} does not advance the version")]
    NonAdvancing { from: Version, to: Version },
    #[error("gap in migration chain: expected a script from {expected}, found one from {found}")]
    CoverageGap { expected: Version, found: Version },
    #[error("migration chain ends at {end} but the current schema version is {current}")]
    IncompleteChain { end: Version, current: Version },
}

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Format does not support the requested direction or option
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// Structurally unusable source document
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Export requested for a JATS version the exporter does not implement
    #[error("Unsupported JATS version '{0}'")]
    UnsupportedVersion(String),
    /// A converted element violates the schema; `path` locates it in the source
    #[error("Invalid content at {path}: {source}")]
    Conversion {
        path: String,
        #[source]
        source: SchemaError,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    /// Error while writing output
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ContentModelViolation> for FormatError {
    fn from(violation: ContentModelViolation) -> Self {
        FormatError::Schema(SchemaError::ContentModel(violation))
    }
}
